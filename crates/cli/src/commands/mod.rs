mod job;
mod query;
mod sqlhist_subcommand;

use crate::error::{Result, SqlhistError};
use clap::Parser;
use sqlhist_core::{db::RowSet, Histogram, HistogramEngine, HistogramOptions, HistogramSpec};
use sqlhist_sqlite::SqliteDb;
use std::path::Path;
use tracing::info;

pub use job::job;
pub use query::{query, QueryCliArgs};
pub use sqlhist_subcommand::SqlhistSubcommand;

#[derive(Parser, Debug)]
#[command(name = "sqlhist", version, about = "Frequency histograms computed inside SQLite")]
pub struct SqlhistCli {
    /// Log at debug level. RUST_LOG takes precedence.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: SqlhistSubcommand,
}

impl SqlhistCli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

fn is_plain_identifier(source: &str) -> bool {
    !source.is_empty() && source.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Opens the database and runs one histogram over `rows`.
fn histogram(db_path: &Path, rows: RowSet, options: HistogramOptions) -> Result<Histogram> {
    if !db_path.exists() {
        return Err(SqlhistError::DbDoesNotExist(db_path.display().to_string()));
    }
    let db = SqliteDb::from_file(&db_path.to_string_lossy())?;
    if is_plain_identifier(rows.source()) && !db.table_exists(rows.source())? {
        return Err(SqlhistError::TableNotFound(rows.source().to_owned()));
    }

    let spec = HistogramSpec::from_options(rows, options);
    let engine = HistogramEngine::new(&db, spec)?;
    let histogram = engine.results()?;
    info!(
        buckets = histogram.len(),
        rows = histogram.total(),
        "computed histogram"
    );
    Ok(histogram)
}
