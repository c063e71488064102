use neighborly_backend::BackendError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A cache key was reused for a different result type.
    #[error("Cached value for {0} has an unexpected type")]
    CacheTypeMismatch(String),
}

pub type Result<T> = std::result::Result<T, DirectoryError>;
