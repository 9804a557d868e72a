use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Fetched record for key '{key}' matches no pending query")]
    UnrequestedResultKey { key: String },

    #[error("Batch fetch failed: {0}")]
    BatchFetch(String),

    #[error("Malformed service payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Data source error: {0}")]
    Source(String),

    #[error("Cache entry '{key}' is in error state: {message}")]
    Entry { key: String, message: String },
}
