use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Wire-level failure reaching the store endpoint.
    #[error("store transport error: {0}")]
    Transport(String),

    /// The store answered but the reply body did not decode.
    #[error("store reply decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The store answered with an error field instead of a result.
    #[error("store rejected command: {0}")]
    Rejected(String),
}
