//! Error types for resolution operations.
//!
//! Every variant carries enough context (file path, alias, reference,
//! destination) to locate the offending input without re-running with
//! extra diagnostics. All of these are fatal to the import that raised
//! them.

use thiserror::Error;

/// Errors that can occur while merging dependencies or resolving
/// references.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Two non-identical declarations share an alias within one scope.
    #[error("conflicting dependency alias(es) in '{context}': {aliases:?}")]
    ConflictingDependency {
        context: String,
        aliases: Vec<String>,
    },

    /// An alias-style reference names an alias with no declaration.
    #[error("no dependency with alias '{alias}' found for reference '{reference}'")]
    UnknownDependencyAlias { alias: String, reference: String },

    /// A dependency declared a protocol outside the supported set.
    #[error("protocol {protocol:?} declared in '{context}' is not valid for resolving dependencies")]
    InvalidProtocol { protocol: String, context: String },

    /// A dependency declaration could not be parsed.
    #[error("malformed dependency declaration in '{context}': {source}")]
    MalformedDependency {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A nested object lacks the required `type` discriminator.
    #[error("object with key '{key}' is missing the required 'type' attribute, file: '{file_path}'")]
    MissingType { key: String, file_path: String },

    /// A required field is absent from an object with reserved semantics.
    #[error("object in '{file_path}' is missing the required '{field}' attribute")]
    MissingField { field: String, file_path: String },

    /// The binary payload a Blob-typed object names cannot be located.
    #[error("blob source '{path}' referenced from '{file_path}' was not found")]
    BlobSourceNotFound { path: String, file_path: String },

    /// A storage-kind reference uses a relative address.
    #[error("relative storage reference '{address}' in '{file_path}' is not supported")]
    UnsupportedRelativeStorageReference { address: String, file_path: String },

    /// A reference could not be composed into an absolute address.
    #[error("'{reference}' could not be resolved (file: '{file_path}', destination: '{destination}')")]
    UnresolvableReference {
        reference: String,
        file_path: String,
        destination: String,
    },

    /// I/O failure while reading a blob payload.
    #[error("io error while reading blob payload: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for resolution operations.
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;
