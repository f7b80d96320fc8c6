use crate::db::{AggregateQuery, BoundKind, BucketRow, DbError, RowSet, Statement};

/// Everything the histogram engine needs from a database.
///
/// Implementations execute SQL assembled from caller-trusted identifiers
/// (the row set's source and the column expression); values are always bound
/// as parameters.
pub trait QueryOps {
    type Error: Into<DbError>;

    /// Minimum or maximum of `expression` over the filtered row set.
    /// Returns `None` when the row set is empty.
    fn observe_bound(
        &self,
        expression: &str,
        rows: &RowSet,
        kind: BoundKind,
    ) -> Result<Option<f64>, Self::Error>;

    /// Minimum and maximum of `expression` over the filtered row set.
    ///
    /// Override this when both can be fetched in one round trip.
    fn observe_bounds(
        &self,
        expression: &str,
        rows: &RowSet,
    ) -> Result<(Option<f64>, Option<f64>), Self::Error> {
        let min = self.observe_bound(expression, rows, BoundKind::Min)?;
        let max = self.observe_bound(expression, rows, BoundKind::Max)?;
        Ok((min, max))
    }

    /// Runs the width-bucket aggregate. Rows come back ordered by bucket index;
    /// a `None` bucket holds values the binning function placed out of range.
    fn execute_aggregate(&self, query: &AggregateQuery) -> Result<Vec<BucketRow>, Self::Error>;

    /// Counts the rows of the row set where `expression = value`.
    fn execute_equality_count(
        &self,
        expression: &str,
        rows: &RowSet,
        value: f64,
    ) -> Result<u64, Self::Error>;

    /// Renders the row set as a subquery selecting only `selected`, with any
    /// ordering replaced by a fixed positional one.
    fn render_subquery(&self, rows: &RowSet, selected: &str) -> Result<Statement, Self::Error>;
}
