//! Import orchestration for dmport.
//!
//! Ties the pipeline together: build a resolved package tree
//! (`dmport-tree`), then drive the remote store (`dmport-store`) to
//! upload it.
//!
//! # Architecture
//!
//! - **Driver** ([`driver`]): uploads a resolved tree in a defined order —
//!   each package document before its children, binary files before the
//!   entities that may reference them, sub-packages last.
//! - **Entity flows** ([`entity`]): single-file and folder imports,
//!   including remote dependency inheritance, force-replace of existing
//!   targets, and the recursive remote "mkdir -p".
//!
//! Upload is not transactional: a mid-tree failure leaves the store
//! partially populated. Callers that need a clean slate re-run with
//! force-replace.

pub mod driver;
pub mod entity;
pub mod error;

pub use driver::{import_package_tree, ImportSummary};
pub use entity::{ensure_package_structure, import_folder_entity, import_single_entity};
pub use error::{ImportError, ImportResult};
