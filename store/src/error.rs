use thiserror::Error;

/// Errors surfaced by persistence operations. Remote failures are never
/// retried internally; they are the caller's to surface.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("remote history operation failed: {0}")]
    Remote(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
