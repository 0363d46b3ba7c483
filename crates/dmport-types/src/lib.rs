//! Core domain types for dmport.
//!
//! This crate defines the vocabulary shared by every other dmport crate:
//! dependency declarations and their fetch protocols, the builtin scalar
//! type names that are never treated as references, the reserved document
//! fields with fixed semantics, and the addresses of the well-known core
//! blueprints in the remote store.
//!
//! # Modules
//!
//! - [`error`] — Error types for parsing domain values
//! - [`dependency`] — [`Dependency`] declarations and [`DependencyProtocol`]
//! - [`builtin`] — Builtin scalar type names ([`BuiltinType`])
//! - [`fields`] — Reserved document field names
//! - [`core_types`] — Addresses of the core blueprints (`Blob`, `Package`, ...)

pub mod builtin;
pub mod core_types;
pub mod dependency;
pub mod error;
pub mod fields;

pub use builtin::BuiltinType;
pub use dependency::{Dependency, DependencyProtocol, ReferenceType};
pub use error::TypeError;
