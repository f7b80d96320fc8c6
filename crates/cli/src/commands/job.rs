use crate::error::Result;
use serde::Deserialize;
use sqlhist_core::{
    db::{RowSet, SqlValue},
    Histogram, HistogramOptions,
};
use std::path::{Path, PathBuf};

/// A histogram run described in TOML.
///
/// ```toml
/// database = "shop.db"
///
/// [source]
/// table = "orders"
/// filters = [{ clause = "status = ?", params = ["paid"] }]
///
/// [histogram]
/// column = "price * 1.1 AS adj_price"
/// bucket_size = 5.0
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    /// SQLite file; relative paths are resolved against the job file's directory.
    pub database: PathBuf,
    pub source: SourceConfig,
    pub histogram: HistogramOptions,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub table: String,
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
    #[serde(default)]
    pub order_by: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    pub clause: String,
    #[serde(default)]
    pub params: Vec<SqlValue>,
}

impl JobFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut job: JobFile = toml::from_str(&contents)?;
        if job.database.is_relative() {
            if let Some(dir) = path.parent() {
                job.database = dir.join(&job.database);
            }
        }
        Ok(job)
    }

    pub fn row_set(&self) -> RowSet {
        let SourceConfig {
            table,
            filters,
            order_by,
        } = &self.source;
        let rows = filters.iter().fold(RowSet::new(table), |rows, f| {
            rows.filter(f.clause.as_str(), f.params.iter().cloned())
        });
        order_by
            .iter()
            .fold(rows, |rows, expr| rows.order_by(expr.as_str()))
    }
}

pub fn job(path: &Path) -> Result<Histogram> {
    let job = JobFile::from_file(path)?;
    super::histogram(&job.database, job.row_set(), job.histogram.clone())
}
