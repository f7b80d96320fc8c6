use crate::{db::RowSet, error::ConfigError, histogram::Column};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BUCKET_SIZE: f64 = 1.0;

/// How bucket width is chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sizing {
    /// Caller picks the width; the count follows from the rounded range.
    FixedSize { bucket_size: f64 },
    /// Caller picks the count; the width follows from the observed range.
    FixedCount { buckets: u32 },
}

/// Histogram options as they appear in config files.
///
/// `buckets` takes precedence over `bucket_size` when both are set.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HistogramOptions {
    /// Column name or SQL expression, optionally followed by `AS <alias>`.
    pub column: String,
    pub bucket_size: Option<f64>,
    pub buckets: Option<u32>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// What to bucket, over which rows, and how.
#[derive(Clone, Debug, PartialEq)]
pub struct HistogramSpec {
    rows: RowSet,
    column: Column,
    bucket_size: Option<f64>,
    buckets: Option<u32>,
    min: Option<f64>,
    max: Option<f64>,
}

impl HistogramSpec {
    /// Fixed-size buckets of width 1 over the observed range of `column`.
    pub fn new(rows: RowSet, column: impl Into<String>) -> Self {
        Self {
            rows,
            column: Column::parse(column),
            bucket_size: None,
            buckets: None,
            min: None,
            max: None,
        }
    }

    pub fn from_options(rows: RowSet, options: HistogramOptions) -> Self {
        let HistogramOptions {
            column,
            bucket_size,
            buckets,
            min,
            max,
        } = options;
        Self {
            bucket_size,
            buckets,
            min,
            max,
            ..Self::new(rows, column)
        }
    }

    pub fn bucket_size(mut self, bucket_size: f64) -> Self {
        self.bucket_size = Some(bucket_size);
        self
    }

    /// Switches to fixed-count mode; any bucket size is then ignored.
    pub fn buckets(mut self, buckets: u32) -> Self {
        self.buckets = Some(buckets);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn rows(&self) -> &RowSet {
        &self.rows
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn sizing(&self) -> Sizing {
        match self.buckets {
            Some(buckets) => Sizing::FixedCount { buckets },
            None => Sizing::FixedSize {
                bucket_size: self.bucket_size.unwrap_or(DEFAULT_BUCKET_SIZE),
            },
        }
    }

    /// Lower bound supplied by the caller. Fixed-count mode starts at 0 unless told otherwise.
    pub fn pinned_min(&self) -> Option<f64> {
        match self.sizing() {
            Sizing::FixedCount { .. } => Some(self.min.unwrap_or(0.0)),
            Sizing::FixedSize { .. } => self.min,
        }
    }

    pub fn pinned_max(&self) -> Option<f64> {
        self.max
    }

    /// Checks everything that can be checked without touching the database.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.column.is_empty() {
            return Err(ConfigError::EmptyColumn);
        }
        match self.sizing() {
            Sizing::FixedCount { buckets: 0 } => return Err(ConfigError::ZeroBuckets),
            Sizing::FixedSize { bucket_size } if !(bucket_size.is_finite() && bucket_size > 0.0) => {
                return Err(ConfigError::InvalidBucketSize(bucket_size));
            }
            _ => {}
        }
        let pinned = [self.pinned_min(), self.pinned_max()];
        if pinned.iter().flatten().any(|v| !v.is_finite()) {
            return Err(ConfigError::NonFiniteBound);
        }
        if let [Some(min), Some(max)] = pinned {
            if min > max {
                return Err(ConfigError::InvertedRange { min, max });
            }
        }
        Ok(())
    }
}
