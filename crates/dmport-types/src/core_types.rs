//! Addresses of the well-known core blueprints in the remote store.
//!
//! These are fully qualified and pass through the resolver unchanged; the
//! rewriter compares resolved `type` values against them to decide on
//! special handling (blob splicing, reference dispatch, dependency
//! address passthrough).

/// A document whose payload is binary content.
pub const BLOB: &str = "dmss://system/SIMOS/Blob";
/// A folder-like container node.
pub const PACKAGE: &str = "dmss://system/SIMOS/Package";
/// A link/storage reference to another document or file.
pub const REFERENCE: &str = "dmss://system/SIMOS/Reference";
/// An uncontained binary file.
pub const FILE: &str = "dmss://system/SIMOS/File";
/// A dependency declaration; its `address` is an external location, not a
/// document reference.
pub const DEPENDENCY: &str = "dmss://system/SIMOS/Dependency";
/// An attribute of a blueprint.
pub const BLUEPRINT_ATTRIBUTE: &str = "dmss://system/SIMOS/BlueprintAttribute";
/// A blueprint (type definition).
pub const BLUEPRINT: &str = "dmss://system/SIMOS/Blueprint";

/// The reserved sentinel address meaning "use the default".
pub const DEFAULT_SENTINEL: &str = "_default_";
