use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SqlhistError {
    #[error("histogram error")]
    Core(#[from] sqlhist_core::Error),

    #[error("db error")]
    Db(#[from] sqlhist_sqlite::Error),

    #[error("database file '{0}' does not exist")]
    #[diagnostic(help("pass the path of an existing SQLite database"))]
    DbDoesNotExist(String),

    #[error("table '{0}' not found in database")]
    TableNotFound(String),

    #[error("io error")]
    Io(#[from] std::io::Error),

    #[error("invalid job file")]
    #[diagnostic(help("a job file needs `database`, a [source] table and a [histogram] section"))]
    JobFile(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SqlhistError>;
