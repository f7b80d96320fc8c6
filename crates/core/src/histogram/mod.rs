//! Frequency histograms computed by the database.
//!
//! The engine resolves a value range and a bucket width, then asks the
//! collaborator for one aggregate that bins every row server-side, and maps
//! the returned bucket indices back to their lower bounds. Everything derived
//! from the database is fetched once per engine and reused.

mod binning;
mod column;
mod round;
mod spec;

pub use binning::width_bucket;
pub use column::Column;
pub use round::{round_to_increment, whole_increments, RoundDirection};
pub use spec::{HistogramOptions, HistogramSpec, Sizing, DEFAULT_BUCKET_SIZE};

use crate::{
    buckets::Histogram,
    db::{AggregateQuery, BucketRow, DbError, QueryOps},
    error::{ConfigError, Error},
    Result,
};
use std::cell::OnceCell;
use tracing::{debug, trace};

pub struct HistogramEngine<'a, D: QueryOps> {
    db: &'a D,
    spec: HistogramSpec,
    source_bounds: OnceCell<(Option<f64>, Option<f64>)>,
    bucket_size: OnceCell<f64>,
    min: OnceCell<f64>,
    max: OnceCell<f64>,
    num_buckets: OnceCell<u32>,
}

fn db_error<E: Into<DbError>>(e: E) -> Error {
    Error::Db(e.into())
}

/// Returns the cached value, or computes and caches it. Errors are not cached.
fn memoized<T: Copy>(cell: &OnceCell<T>, init: impl FnOnce() -> Result<T>) -> Result<T> {
    if let Some(value) = cell.get() {
        return Ok(*value);
    }
    let value = init()?;
    Ok(*cell.get_or_init(|| value))
}

impl<'a, D: QueryOps> HistogramEngine<'a, D> {
    pub fn new(db: &'a D, spec: HistogramSpec) -> Result<Self> {
        spec.validate()?;
        Ok(Self {
            db,
            spec,
            source_bounds: OnceCell::new(),
            bucket_size: OnceCell::new(),
            min: OnceCell::new(),
            max: OnceCell::new(),
            num_buckets: OnceCell::new(),
        })
    }

    /// Bucket label -> frequency, in ascending bucket order.
    ///
    /// When the resolved range is a single point, the histogram is one bucket
    /// holding the rows equal to it.
    pub fn results(&self) -> Result<Histogram> {
        let min = self.min()?;
        let max = self.max()?;
        if min == max {
            debug!(value = min, "empty bucket range, counting equal values");
            let count = self
                .db
                .execute_equality_count(self.spec.column().expression(), self.spec.rows(), min)
                .map_err(db_error)?;
            return Ok([(min, count)].into_iter().collect());
        }
        if min > max {
            return Err(ConfigError::InvertedRange { min, max }.into());
        }
        self.labeled_histogram()
    }

    /// Lower bound of the first bucket.
    pub fn min(&self) -> Result<f64> {
        memoized(&self.min, || match self.spec.pinned_min() {
            Some(min) => Ok(min),
            None => {
                let (source_min, _) = self.source_bounds()?;
                Ok(round_to_increment(
                    source_min,
                    self.bucket_size()?,
                    Some(RoundDirection::Down),
                ))
            }
        })
    }

    /// Upper bound of the last bucket.
    pub fn max(&self) -> Result<f64> {
        memoized(&self.max, || match self.spec.pinned_max() {
            Some(max) => Ok(max),
            None => {
                let (_, source_max) = self.source_bounds()?;
                Ok(round_to_increment(
                    source_max,
                    self.bucket_size()?,
                    Some(RoundDirection::Up),
                ))
            }
        })
    }

    /// Width of each bucket. In fixed-count mode this splits the raw observed
    /// range, before it is rounded outward.
    pub fn bucket_size(&self) -> Result<f64> {
        memoized(&self.bucket_size, || match self.spec.sizing() {
            Sizing::FixedSize { bucket_size } => Ok(bucket_size),
            Sizing::FixedCount { buckets } => {
                let (source_min, source_max) = self.source_bounds()?;
                let span = source_max.unwrap_or(0.0) - source_min.unwrap_or(0.0);
                let bucket_size = span / f64::from(buckets);
                if !(bucket_size.is_finite() && bucket_size > 0.0) {
                    return Err(ConfigError::ZeroWidthBuckets {
                        source_min,
                        source_max,
                        buckets,
                    }
                    .into());
                }
                Ok(bucket_size)
            }
        })
    }

    pub fn num_buckets(&self) -> Result<u32> {
        memoized(&self.num_buckets, || match self.spec.sizing() {
            Sizing::FixedCount { buckets } => Ok(buckets),
            Sizing::FixedSize { bucket_size } => {
                let span = self.max()? - self.min()?;
                let count = whole_increments(span, bucket_size);
                Ok(count.clamp(1.0, f64::from(u32::MAX)) as u32)
            }
        })
    }

    /// Observed minimum and maximum of the column over the row set.
    fn source_bounds(&self) -> Result<(Option<f64>, Option<f64>)> {
        memoized(&self.source_bounds, || {
            let bounds = self
                .db
                .observe_bounds(self.spec.column().expression(), self.spec.rows())
                .map_err(db_error)?;
            debug!(source_min = ?bounds.0, source_max = ?bounds.1, "observed column bounds");
            Ok(bounds)
        })
    }

    fn bucket_label(&self, min: f64, bucket_size: f64, bucket: i64) -> f64 {
        min + bucket_size * (bucket - 1) as f64
    }

    fn labeled_histogram(&self) -> Result<Histogram> {
        let min = self.min()?;
        let max = self.max()?;
        let bucket_size = self.bucket_size()?;
        let num_buckets = self.num_buckets()?;
        let column = self.spec.column();
        debug!(
            min,
            max,
            bucket_size,
            num_buckets,
            aliased = column.has_alias(),
            "bucketing column"
        );

        let subquery = self
            .db
            .render_subquery(self.spec.rows(), column.as_selected())
            .map_err(db_error)?;
        let query = AggregateQuery::new(subquery, column.alias(), min, max, num_buckets);
        let rows = self.db.execute_aggregate(&query).map_err(db_error)?;

        let mut histogram = Histogram::with_capacity(rows.len());
        for BucketRow { bucket, frequency } in rows {
            match bucket {
                Some(bucket) if (1..=i64::from(num_buckets)).contains(&bucket) => {
                    histogram.push(self.bucket_label(min, bucket_size, bucket), frequency);
                }
                _ => trace!(?bucket, frequency, "dropping rows outside [min, max]"),
            }
        }
        Ok(histogram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{BoundKind, MockCall, MockDb, RowSet};

    const DATA: [f64; 5] = [1.0, 2.0, 2.0, 5.0, 9.0];

    fn spec() -> HistogramSpec {
        HistogramSpec::new(RowSet::new("samples"), "value")
    }

    #[test]
    fn fixed_size_rounds_range_outward() {
        let db = MockDb::new(DATA);
        let engine = HistogramEngine::new(&db, spec().bucket_size(5.0)).unwrap();
        assert_eq!(engine.min().unwrap(), 0.0);
        assert_eq!(engine.max().unwrap(), 10.0);
        assert_eq!(engine.num_buckets().unwrap(), 2);
        assert_eq!(engine.results().unwrap().to_pairs(), vec![(0.0, 3), (5.0, 2)]);
    }

    #[test]
    fn fixed_count_derives_size_from_raw_bounds() {
        let db = MockDb::new(DATA);
        let engine = HistogramEngine::new(&db, spec().buckets(2)).unwrap();
        assert_eq!(engine.bucket_size().unwrap(), 4.0);
        assert_eq!(engine.min().unwrap(), 0.0);
        assert_eq!(engine.max().unwrap(), 12.0);
        assert_eq!(engine.num_buckets().unwrap(), 2);
        // [0, 12] is split in two bins of width 6, so 5 falls in the first;
        // labels still step by the derived size
        assert_eq!(engine.results().unwrap().to_pairs(), vec![(0.0, 4), (4.0, 1)]);
    }

    #[test]
    fn fixed_count_honours_caller_min() {
        let db = MockDb::new([10.0, 12.0, 14.0, 18.0]);
        let engine = HistogramEngine::new(&db, spec().buckets(4).min(10.0)).unwrap();
        assert_eq!(engine.bucket_size().unwrap(), 2.0);
        assert_eq!(engine.min().unwrap(), 10.0);
        assert_eq!(engine.max().unwrap(), 18.0);
        assert_eq!(
            engine.results().unwrap().to_pairs(),
            vec![(10.0, 1), (12.0, 1), (14.0, 1), (16.0, 1)]
        );
    }

    #[test]
    fn max_value_lands_in_last_bucket() {
        let db = MockDb::new([0.0, 5.0, 10.0]);
        let engine = HistogramEngine::new(&db, spec().bucket_size(5.0)).unwrap();
        let hist = engine.results().unwrap();
        assert_eq!(hist.to_pairs(), vec![(0.0, 1), (5.0, 2)]);
        assert_eq!(hist.total(), 3);
    }

    #[test]
    fn results_are_memoized() {
        let db = MockDb::new(DATA);
        let engine = HistogramEngine::new(&db, spec().bucket_size(5.0)).unwrap();
        let first = engine.results().unwrap();
        let observations = db.num_observations();
        assert_eq!(observations, 2);
        let second = engine.results().unwrap();
        assert_eq!(first, second);
        assert_eq!(db.num_observations(), observations);
    }

    #[test]
    fn fixed_count_observes_once() {
        let db = MockDb::new(DATA);
        let engine = HistogramEngine::new(&db, spec().buckets(2)).unwrap();
        engine.results().unwrap();
        engine.results().unwrap();
        assert_eq!(db.num_observations(), 2);
    }

    #[test]
    fn pinned_bounds_skip_observation() {
        let db = MockDb::new(DATA);
        let engine =
            HistogramEngine::new(&db, spec().bucket_size(5.0).min(0.0).max(10.0)).unwrap();
        engine.results().unwrap();
        assert_eq!(db.num_observations(), 0);
    }

    #[test]
    fn degenerate_range_uses_equality_count() {
        let db = MockDb::new([5.0, 5.0, 5.0]);
        let engine = HistogramEngine::new(&db, spec().min(5.0).max(5.0)).unwrap();
        assert_eq!(engine.results().unwrap().to_pairs(), vec![(5.0, 3)]);
        let calls = db.calls();
        assert_eq!(
            calls,
            vec![MockCall::EqualityCount {
                expression: "value".to_owned(),
                value: 5.0
            }]
        );
    }

    #[test]
    fn single_observed_value_uses_equality_count() {
        let db = MockDb::new([5.0, 5.0]);
        let engine = HistogramEngine::new(&db, spec().bucket_size(5.0)).unwrap();
        assert_eq!(engine.results().unwrap().to_pairs(), vec![(5.0, 2)]);
        assert!(!db
            .calls()
            .iter()
            .any(|c| matches!(c, MockCall::Aggregate { .. })));
    }

    #[test]
    fn empty_row_set_counts_zero_at_origin() {
        let db = MockDb::new([]);
        let engine = HistogramEngine::new(&db, spec().bucket_size(5.0)).unwrap();
        assert_eq!(engine.min().unwrap(), 0.0);
        assert_eq!(engine.max().unwrap(), 0.0);
        assert_eq!(engine.results().unwrap().to_pairs(), vec![(0.0, 0)]);
    }

    #[test]
    fn zero_width_buckets_are_a_configuration_error() {
        let db = MockDb::new([3.0, 3.0]);
        let engine = HistogramEngine::new(&db, spec().buckets(4)).unwrap();
        match engine.results() {
            Err(Error::InvalidConfiguration(err)) => assert_eq!(
                err,
                ConfigError::ZeroWidthBuckets {
                    source_min: Some(3.0),
                    source_max: Some(3.0),
                    buckets: 4
                }
            ),
            other => panic!("expected a configuration error, got {other:?}"),
        }
    }

    #[test]
    fn fixed_count_on_empty_row_set_is_a_configuration_error() {
        let db = MockDb::new([]);
        let engine = HistogramEngine::new(&db, spec().buckets(4)).unwrap();
        assert!(matches!(
            engine.results(),
            Err(Error::InvalidConfiguration(ConfigError::ZeroWidthBuckets { .. }))
        ));
    }

    #[test]
    fn out_of_range_rows_are_dropped() {
        let db = MockDb::new([-4.0, 1.0, 2.0, 6.0, 25.0]);
        let engine =
            HistogramEngine::new(&db, spec().bucket_size(5.0).min(0.0).max(10.0)).unwrap();
        let hist = engine.results().unwrap();
        assert_eq!(hist.to_pairs(), vec![(0.0, 2), (5.0, 1)]);
        assert_eq!(hist.total(), 3);
    }

    #[test]
    fn overflow_bucket_indices_are_dropped() {
        let db = MockDb::new([-4.0, 1.0, 2.0, 6.0, 10.0, 25.0]).with_overflow_buckets();
        let engine =
            HistogramEngine::new(&db, spec().bucket_size(5.0).min(0.0).max(10.0)).unwrap();
        let hist = engine.results().unwrap();
        assert_eq!(hist.labels().collect::<Vec<_>>(), vec![0.0, 5.0]);
        assert!(hist.get(-5.0).is_none());
        assert!(hist.get(10.0).is_none());
    }

    #[test]
    fn null_values_are_not_counted() {
        let db = MockDb::with_nulls([Some(1.0), None, Some(7.0), None]);
        let engine = HistogramEngine::new(&db, spec().bucket_size(5.0)).unwrap();
        let hist = engine.results().unwrap();
        assert_eq!(hist.to_pairs(), vec![(0.0, 1), (5.0, 1)]);
    }

    #[test]
    fn aliased_column_routes_each_part() {
        let db = MockDb::new(DATA);
        let spec = HistogramSpec::new(RowSet::new("orders"), "price * 1.1 AS adj_price")
            .bucket_size(5.0);
        HistogramEngine::new(&db, spec).unwrap().results().unwrap();
        assert_eq!(
            db.calls(),
            vec![
                MockCall::ObserveBound {
                    expression: "price * 1.1".to_owned(),
                    kind: BoundKind::Min
                },
                MockCall::ObserveBound {
                    expression: "price * 1.1".to_owned(),
                    kind: BoundKind::Max
                },
                MockCall::RenderSubquery {
                    selected: "price * 1.1 AS adj_price".to_owned()
                },
                MockCall::Aggregate {
                    column: "adj_price".to_owned(),
                    min: 0.0,
                    max: 10.0,
                    num_buckets: 2
                },
            ]
        );
    }

    #[test]
    fn aliased_column_equality_count_uses_expression() {
        let db = MockDb::new([5.0]);
        let spec = HistogramSpec::new(RowSet::new("orders"), "price * 1.1 AS adj_price")
            .min(5.0)
            .max(5.0);
        HistogramEngine::new(&db, spec).unwrap().results().unwrap();
        assert_eq!(
            db.calls(),
            vec![MockCall::EqualityCount {
                expression: "price * 1.1".to_owned(),
                value: 5.0
            }]
        );
    }

    #[test]
    fn resolved_bounds_are_outward_multiples() {
        let data = [-7.3, 0.4, 3.9, 12.25, 18.0, 41.7];
        for bucket_size in [0.5, 1.0, 2.5, 3.0, 7.0, 10.0] {
            let db = MockDb::new(data);
            let engine = HistogramEngine::new(&db, spec().bucket_size(bucket_size)).unwrap();
            let (min, max) = (engine.min().unwrap(), engine.max().unwrap());
            assert!(min <= -7.3, "min {min} for size {bucket_size}");
            assert!(max >= 41.7, "max {max} for size {bucket_size}");
            for bound in [min, max] {
                let steps = bound / bucket_size;
                assert!((steps - steps.round()).abs() < 1e-9, "{bound} / {bucket_size}");
            }
            let num_buckets = engine.num_buckets().unwrap();
            assert_eq!(f64::from(num_buckets), ((max - min) / bucket_size).round());
            assert!(num_buckets >= 1);
            assert_eq!(engine.results().unwrap().total(), data.len() as u64);
        }
    }

    #[test]
    fn narrow_pinned_range_has_one_bucket() {
        let db = MockDb::new([0.1, 0.2]);
        let engine = HistogramEngine::new(&db, spec().min(0.0).max(0.5)).unwrap();
        assert_eq!(engine.num_buckets().unwrap(), 1);
        assert_eq!(engine.results().unwrap().to_pairs(), vec![(0.0, 2)]);
    }

    #[test]
    fn pinned_min_above_observed_max_is_inverted() {
        let db = MockDb::new([1.0, 2.0]);
        let engine = HistogramEngine::new(&db, spec().min(10.0)).unwrap();
        assert!(matches!(
            engine.results(),
            Err(Error::InvalidConfiguration(ConfigError::InvertedRange { .. }))
        ));
    }

    #[test]
    fn fixed_count_over_negative_values_is_inverted() {
        // min defaults to 0 in count mode, above the rounded-up max of -4
        let db = MockDb::new([-9.0, -5.0]);
        let engine = HistogramEngine::new(&db, spec().buckets(2)).unwrap();
        assert_eq!(engine.bucket_size().unwrap(), 2.0);
        assert_eq!(engine.max().unwrap(), -4.0);
        match engine.results() {
            Err(Error::InvalidConfiguration(err)) => {
                assert_eq!(err, ConfigError::InvertedRange { min: 0.0, max: -4.0 })
            }
            other => panic!("expected an inverted range, got {other:?}"),
        }
        assert!(!db
            .calls()
            .iter()
            .any(|c| matches!(c, MockCall::Aggregate { .. })));
    }

    #[test]
    fn rejects_invalid_spec_up_front() {
        let db = MockDb::new(DATA);
        assert!(matches!(
            HistogramEngine::new(&db, spec().bucket_size(0.0)),
            Err(Error::InvalidConfiguration(ConfigError::InvalidBucketSize(_)))
        ));
        assert!(db.calls().is_empty());
    }
}
