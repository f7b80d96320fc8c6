use super::{AggregateQuery, BoundKind, BucketRow, QueryOps, RowSet, Statement};
use crate::{db::DbError, histogram::width_bucket};
use std::{cell::RefCell, collections::BTreeMap};

/// A collaborator over an in-memory column of values.
///
/// Filters and expressions are not evaluated: `values` stands for the column
/// expression over the already-filtered row set. Every call is recorded.
#[derive(Debug, Default)]
pub struct MockDb {
    values: Vec<Option<f64>>,
    overflow_buckets: bool,
    calls: RefCell<Vec<MockCall>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MockCall {
    ObserveBound { expression: String, kind: BoundKind },
    Aggregate { column: String, min: f64, max: f64, num_buckets: u32 },
    EqualityCount { expression: String, value: f64 },
    RenderSubquery { selected: String },
}

#[derive(Debug)]
pub enum MockError {}

impl std::fmt::Display for MockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mock error")
    }
}

impl std::error::Error for MockError {}

impl From<MockError> for DbError {
    fn from(value: MockError) -> Self {
        match value {}
    }
}

impl From<MockError> for crate::Error {
    fn from(value: MockError) -> Self {
        Self::Db(value.into())
    }
}

impl MockDb {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self::with_nulls(values.into_iter().map(Some))
    }

    /// Like `new`, but `None` entries stand for rows whose column is NULL.
    pub fn with_nulls(values: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            values: values.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Bin like PostgreSQL: values below `min` land in bucket 0 and values at
    /// or above `max` in bucket `count + 1` instead of NULL.
    pub fn with_overflow_buckets(mut self) -> Self {
        self.overflow_buckets = true;
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.borrow().clone()
    }

    pub fn num_observations(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, MockCall::ObserveBound { .. }))
            .count()
    }

    fn record(&self, call: MockCall) {
        self.calls.borrow_mut().push(call);
    }

    fn bucket_of(&self, value: f64, query: &AggregateQuery) -> Option<i64> {
        let (min, max, num_buckets) = (query.min, query.max, query.num_buckets);
        if self.overflow_buckets {
            if value < min {
                return Some(0);
            }
            if value >= max {
                return Some(num_buckets as i64 + 1);
            }
        }
        width_bucket(value, min, max, num_buckets)
    }
}

impl QueryOps for MockDb {
    type Error = MockError;

    fn observe_bound(
        &self,
        expression: &str,
        _rows: &RowSet,
        kind: BoundKind,
    ) -> Result<Option<f64>, Self::Error> {
        self.record(MockCall::ObserveBound {
            expression: expression.to_owned(),
            kind,
        });
        let values = self.values.iter().flatten().copied();
        Ok(match kind {
            BoundKind::Min => values.reduce(f64::min),
            BoundKind::Max => values.reduce(f64::max),
        })
    }

    fn execute_aggregate(&self, query: &AggregateQuery) -> Result<Vec<BucketRow>, Self::Error> {
        self.record(MockCall::Aggregate {
            column: query.column.clone(),
            min: query.min,
            max: query.max,
            num_buckets: query.num_buckets,
        });
        let mut counts: BTreeMap<Option<i64>, u64> = BTreeMap::new();
        for value in &self.values {
            let bucket = value.and_then(|v| self.bucket_of(v, query));
            *counts.entry(bucket).or_default() += 1;
        }
        Ok(counts.into_iter().map(BucketRow::from).collect())
    }

    fn execute_equality_count(
        &self,
        expression: &str,
        _rows: &RowSet,
        value: f64,
    ) -> Result<u64, Self::Error> {
        self.record(MockCall::EqualityCount {
            expression: expression.to_owned(),
            value,
        });
        Ok(self.values.iter().filter(|v| **v == Some(value)).count() as u64)
    }

    fn render_subquery(&self, rows: &RowSet, selected: &str) -> Result<Statement, Self::Error> {
        self.record(MockCall::RenderSubquery {
            selected: selected.to_owned(),
        });
        Ok(rows.subquery(selected))
    }
}
