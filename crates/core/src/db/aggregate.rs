use crate::db::{SqlValue, Statement};

pub const BUCKET_COL: &str = "bucket";
pub const FREQUENCY_COL: &str = "frequency";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundKind {
    Min,
    Max,
}

impl BoundKind {
    pub fn sql_function(&self) -> &'static str {
        match self {
            BoundKind::Min => "MIN",
            BoundKind::Max => "MAX",
        }
    }
}

/// One row of the aggregate: a 1-based bucket index (or `None` for values the
/// binning function left out) and the number of rows in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BucketRow {
    pub bucket: Option<i64>,
    pub frequency: u64,
}

impl From<(Option<i64>, u64)> for BucketRow {
    fn from((bucket, frequency): (Option<i64>, u64)) -> Self {
        Self { bucket, frequency }
    }
}

/// Counts rows of a subquery per equal-width bucket over `[min, max]`.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateQuery {
    pub subquery: Statement,
    /// Name of the subquery's output column.
    pub column: String,
    pub min: f64,
    pub max: f64,
    pub num_buckets: u32,
}

impl AggregateQuery {
    pub fn new(
        subquery: Statement,
        column: impl Into<String>,
        min: f64,
        max: f64,
        num_buckets: u32,
    ) -> Self {
        Self {
            subquery,
            column: column.into(),
            min,
            max,
            num_buckets,
        }
    }

    /// Renders the aggregate with `min`, `max` and the bucket count bound ahead
    /// of the subquery's own params.
    pub fn statement(&self) -> Statement {
        let sql = format!(
            "SELECT width_bucket({column}, ?, ?, ?) AS {BUCKET_COL}, COUNT(*) AS {FREQUENCY_COL} \
             FROM ({subquery}) AS subq_results \
             GROUP BY {BUCKET_COL} \
             ORDER BY {BUCKET_COL}",
            column = self.column,
            subquery = self.subquery.sql,
        );
        let mut params = vec![
            SqlValue::Real(self.min),
            SqlValue::Real(self.max),
            SqlValue::from(self.num_buckets),
        ];
        params.extend(self.subquery.params.iter().cloned());
        Statement { sql, params }
    }
}
