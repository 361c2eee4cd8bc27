use thiserror::Error;

/// Represents errors returned by a SQL executor.
///
/// The message of a driver error is surfaced to the operator verbatim, so it
/// is kept as close as possible to what the database reported.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("MySQL error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to decode column {column}: {message}")]
    Decode { column: usize, message: String },

    /// A failure reported by a non-sqlx executor, such as the mock.
    #[error("MySQL error: {0}")]
    Driver(String),
}

impl ExecutorError {
    pub fn driver(msg: impl Into<String>) -> Self {
        Self::Driver(msg.into())
    }
}
