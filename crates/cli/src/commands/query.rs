use crate::error::Result;
use clap::Args;
use sqlhist_core::{
    db::{RowSet, SqlValue},
    Histogram, HistogramOptions,
};
use std::path::Path;

#[derive(Debug, Args)]
pub struct QueryCliArgs {
    /// Path to the SQLite database file.
    #[arg(long = "db", env = "SQLHIST_DB")]
    pub db: String,

    /// Table (or join clause) to read rows from.
    #[arg(short, long)]
    pub table: String,

    /// Column or SQL expression to bucket, optionally followed by `AS <alias>`.
    #[arg(short, long)]
    pub column: String,

    /// SQL predicate restricting the rows. May be repeated; predicates are ANDed.
    #[arg(short, long = "filter", value_name = "PREDICATE")]
    pub filters: Vec<String>,

    /// Width of each bucket. Ignored when --buckets is given.
    #[arg(short = 's', long, allow_negative_numbers = true)]
    pub bucket_size: Option<f64>,

    /// Number of buckets; the width is derived from the observed range.
    #[arg(short, long)]
    pub buckets: Option<u32>,

    /// Lower bound of the first bucket. Defaults to the observed minimum
    /// rounded down (or 0 with --buckets).
    #[arg(long, allow_negative_numbers = true)]
    pub min: Option<f64>,

    /// Upper bound of the last bucket. Defaults to the observed maximum rounded up.
    #[arg(long, allow_negative_numbers = true)]
    pub max: Option<f64>,
}

impl QueryCliArgs {
    pub fn row_set(&self) -> RowSet {
        self.filters
            .iter()
            .fold(RowSet::new(&self.table), |rows, clause| {
                rows.filter(clause.as_str(), std::iter::empty::<SqlValue>())
            })
    }

    pub fn options(&self) -> HistogramOptions {
        HistogramOptions {
            column: self.column.to_owned(),
            bucket_size: self.bucket_size,
            buckets: self.buckets,
            min: self.min,
            max: self.max,
        }
    }
}

pub fn query(args: &QueryCliArgs) -> Result<Histogram> {
    super::histogram(Path::new(&args.db), args.row_set(), args.options())
}
