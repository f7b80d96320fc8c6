use sqlhist_core::db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("error from db connection pool: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("failed to execute query: {0}")]
    ExecuteQuery(#[from] rusqlite::Error),
}

impl From<Error> for sqlhist_core::Error {
    fn from(e: Error) -> Self {
        Self::Db(e.into())
    }
}

impl From<Error> for DbError {
    fn from(value: Error) -> Self {
        DbError::Query(Box::new(value))
    }
}
