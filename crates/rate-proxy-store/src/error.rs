use thiserror::Error;

/// Errors returned by [`SharedStore`](crate::SharedStore) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The shared store could not be reached or refused the operation.
    #[error("shared store unavailable: {0}")]
    Unavailable(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}
