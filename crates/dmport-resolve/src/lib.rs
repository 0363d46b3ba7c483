//! Reference resolution for dmport.
//!
//! This crate is the linker at the center of the import pipeline. Documents
//! on disk refer to each other with five different addressing schemes —
//! fully qualified, alias-qualified, dotted-relative, data-source-absolute,
//! and package-relative — and this crate rewrites all of them into the one
//! canonical form the remote store understands:
//! `<protocol>://<data-source>/<root-package>/.../<entity>`.
//!
//! # Architecture
//!
//! - **Dependency table** ([`dependencies`]): merges the `_meta_`
//!   declarations of every file in a package into one alias → address map,
//!   rejecting conflicting redeclarations.
//! - **Reference resolver** ([`reference`]): a pure function from a raw
//!   reference string to an absolute address, dispatching on syntax alone.
//! - **Document rewriter** ([`rewrite`]): walks a JSON document field by
//!   field, resolving every reference-bearing value, splicing binary blob
//!   payloads, and recursing into nested objects and arrays.
//!
//! Resolution is deterministic and free of I/O except for blob payload
//! reads, which go through the [`BlobSource`] trait.

pub mod dependencies;
pub mod error;
pub mod reference;
pub mod rewrite;

pub use dependencies::{merge_dependencies, meta_dependencies, parse_dependency, DependencyTable};
pub use error::{ResolveError, ResolveResult};
pub use reference::{classify_reference, resolve_reference, ReferenceScheme};
pub use rewrite::{rewrite_document, BlobSource, DirectoryBlobSource, NoBlobSource, RewriteContext};
