//! Error types for parsing domain values.

use thiserror::Error;

/// Errors that can occur when parsing domain values from documents.
#[derive(Debug, Error)]
pub enum TypeError {
    /// A dependency declared a fetch protocol outside the supported set.
    #[error("unknown dependency protocol: {protocol:?}")]
    UnknownProtocol { protocol: String },

    /// A reference type discriminator outside the supported set.
    #[error("unknown reference type: {value:?}")]
    UnknownReferenceType { value: String },
}
