use crate::catalog::QueryId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query '{query}' failed: {message}")]
    Query { query: QueryId, message: String },

    #[error("Query '{query}' timed out after {timeout_secs}s")]
    QueryTimeout { query: QueryId, timeout_secs: u64 },

    #[error("Query '{query}' was cut off by the {budget_ms}ms page load deadline")]
    LoadDeadline { query: QueryId, budget_ms: u64 },

    #[error("Chart '{query}' could not be rendered: {message}")]
    Render { query: QueryId, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The catalog query this error belongs to, if any.
    pub fn query(&self) -> Option<QueryId> {
        match self {
            Self::Query { query, .. }
            | Self::QueryTimeout { query, .. }
            | Self::LoadDeadline { query, .. }
            | Self::Render { query, .. } => Some(*query),
            _ => None,
        }
    }
}
