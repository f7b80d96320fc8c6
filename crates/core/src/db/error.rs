use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// A query failed inside the collaborator. The collaborator's own error is kept as the source.
    #[error("query failed: {0}")]
    Query(#[source] Box<dyn std::error::Error + Send + Sync>),
}
