mod aggregate;
mod error;
mod mock;
mod row_set;
mod sql_value;
mod r#trait;

pub use aggregate::{AggregateQuery, BoundKind, BucketRow, BUCKET_COL, FREQUENCY_COL};
pub use error::DbError;
pub use mock::{MockCall, MockDb, MockError};
pub use r#trait::QueryOps;
pub use row_set::{Filter, RowSet, Statement};
pub use sql_value::SqlValue;
