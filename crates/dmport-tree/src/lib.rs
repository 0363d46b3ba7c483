//! Package tree construction for dmport.
//!
//! An import starts from a flat listing of files — a zip archive, a
//! directory on disk, or an in-memory listing — and ends with a fully
//! reference-resolved in-memory [`Package`] tree ready for upload.
//!
//! # Architecture
//!
//! - **Sources** ([`source`]): the [`ImportSource`] trait abstracts the
//!   flat listing; [`ZipSource`], [`DirectorySource`] and [`MemorySource`]
//!   implement it.
//! - **Nodes** ([`node`]): [`Package`] with tagged-union children —
//!   sub-packages, parsed JSON entities, and raw binary files are distinct
//!   kinds, matched exhaustively at every traversal site.
//! - **Builder** ([`builder`]): reconstructs the folder hierarchy from the
//!   listing, folds every file's dependency declarations into one table,
//!   then rewrites every document in a second pass.
//!
//! Construction is single-threaded and deterministic: sources return
//! sorted listings, so the same input always produces the same tree.

pub mod builder;
pub mod error;
pub mod node;
pub mod source;

pub use builder::build_package_tree;
pub use error::{TreeError, TreeResult};
pub use node::{BinaryFile, Entity, Package, PackageEntry};
pub use source::{DirectorySource, ImportSource, MemorySource, SourceBlobs, SourceEntry, ZipSource};
