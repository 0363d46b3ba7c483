//! Reserved document field names with fixed semantics.
//!
//! Every field listed here is special-cased somewhere in the rewrite or
//! upload pipeline. `BLOB_DATA` is the temporary payload key spliced into
//! Blob-typed objects between rewrite and upload; it never appears in user
//! documents or in the store.

/// The type reference of a document or nested object.
pub const TYPE: &str = "type";
/// The type an attribute holds: a builtin scalar name or a reference.
pub const ATTRIBUTE_TYPE: &str = "attributeType";
/// List of blueprint references a blueprint extends.
pub const EXTENDS: &str = "extends";
/// Metadata block: version and dependency declarations.
pub const META: &str = "_meta_";
/// Document identifier.
pub const ID: &str = "_id";
/// Path to the blueprint describing a document.
pub const BLUEPRINT_PATH: &str = "_blueprintPath_";
/// Address field of Reference-typed objects.
pub const ADDRESS: &str = "address";
/// Discriminator on Reference-typed objects: link, pointer, or storage.
pub const REFERENCE_TYPE: &str = "referenceType";
/// Reference to an enum definition.
pub const ENUM_TYPE: &str = "enumType";
/// Document or entry name.
pub const NAME: &str = "name";
/// Dependency declaration list inside `_meta_`.
pub const DEPENDENCIES: &str = "dependencies";
/// Marks the top-level package of an import.
pub const IS_ROOT: &str = "isRoot";
/// A package's child references.
pub const CONTENT: &str = "content";
/// Human-readable description.
pub const DESCRIPTION: &str = "description";

/// Temporary binary-payload key (hex-encoded) on spliced Blob objects.
pub const BLOB_DATA: &str = "_blob_data_";
/// Generated id of an uploaded blob.
pub const BLOB_ID: &str = "_blob_id";
/// Byte size recorded on an uploaded blob document.
pub const SIZE: &str = "size";

/// The keys whose string values may carry a reference and are passed
/// through the resolver.
pub const REFERENCE_BEARING_KEYS: [&str; 6] = [
    TYPE,
    ATTRIBUTE_TYPE,
    EXTENDS,
    BLUEPRINT_PATH,
    ADDRESS,
    ENUM_TYPE,
];
