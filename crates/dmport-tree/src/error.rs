//! Error types for tree construction.

use thiserror::Error;

use dmport_resolve::ResolveError;

/// Errors that can occur while building a package tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The source contains no entries at all.
    #[error("import source is empty")]
    EmptySource,

    /// A file expected to be JSON failed to parse.
    #[error("failed to load the file '{path}' as a JSON document: {source}")]
    MalformedDocument {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A listed entry could not be read back from the source.
    #[error("source entry '{path}' could not be read")]
    MissingEntry { path: String },

    /// The archive could not be opened.
    #[error("invalid archive: {reason}")]
    InvalidArchive { reason: String },

    /// Dependency merging or reference resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// I/O failure while reading the source.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for tree operations.
pub type TreeResult<T> = std::result::Result<T, TreeError>;
