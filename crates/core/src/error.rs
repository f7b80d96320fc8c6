use crate::db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("database error")]
    Db(#[from] DbError),
}

/// Caller configuration that can't produce a histogram.
///
/// Distinct from an empty bucket range in the data (`min == max`), which is
/// answered with a single equality count instead of an error.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("column expression is empty")]
    EmptyColumn,

    #[error("bucket_size must be a positive finite number, got {0}")]
    InvalidBucketSize(f64),

    #[error("buckets must be at least 1")]
    ZeroBuckets,

    #[error("min and max must be finite numbers")]
    NonFiniteBound,

    #[error("min ({min}) is greater than max ({max})")]
    InvertedRange { min: f64, max: f64 },

    #[error("cannot split observed range [{source_min:?}, {source_max:?}] into {buckets} buckets; bucket width would be zero")]
    ZeroWidthBuckets {
        source_min: Option<f64>,
        source_max: Option<f64>,
        buckets: u32,
    },
}
