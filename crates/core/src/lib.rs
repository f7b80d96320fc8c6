pub mod buckets;
pub mod db;
pub mod error;
pub mod histogram;

pub type Result<T> = std::result::Result<T, error::Error>;
pub use buckets::{Bucket, Histogram};
pub use error::Error;
pub use histogram::{HistogramEngine, HistogramOptions, HistogramSpec};
