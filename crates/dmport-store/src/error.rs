//! Error types for document-store operations.

use thiserror::Error;

/// Errors that can occur talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document exists at the address.
    #[error("document not found: {address}")]
    NotFound { address: String },

    /// A document already exists at the address.
    #[error("document already exists: {address}")]
    AlreadyExists { address: String },

    /// The store rejected the request.
    #[error("store rejected request for '{address}': {message}")]
    Rejected { address: String, message: String },

    /// The transport failed (connection, timeout, TLS).
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The store's response could not be interpreted.
    #[error("invalid store response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

/// Convenience alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
