#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The submitted expression text could not be compiled.
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// A worker reported an operator-level failure (e.g. division by zero).
    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl CoreError {
    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::Syntax(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}
