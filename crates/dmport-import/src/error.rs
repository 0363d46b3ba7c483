//! Error types for import orchestration.

use thiserror::Error;

use dmport_resolve::ResolveError;
use dmport_store::StoreError;
use dmport_tree::TreeError;

/// Errors that can occur while importing entities or packages.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The upload target already exists and overwriting was not allowed.
    #[error("failed to upload to 'dmss://{address}' - it already exists")]
    TargetAlreadyExists { address: String },

    /// The destination does not name a data source and package.
    #[error("invalid destination '{destination}': expected <data-source>/<package>")]
    InvalidDestination { destination: String },

    /// The source path cannot be imported.
    #[error("invalid import source '{path}': {reason}")]
    InvalidSource { path: String, reason: String },

    /// A spliced blob payload could not be decoded for upload.
    #[error("blob payload on '{name}' is not valid hex")]
    InvalidBlobPayload { name: String },

    /// Tree construction failed.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Dependency merging or reference resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The document store refused an operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// I/O failure reading the import source.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for import operations.
pub type ImportResult<T> = std::result::Result<T, ImportError>;
