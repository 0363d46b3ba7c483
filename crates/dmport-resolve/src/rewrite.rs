//! Recursive document rewriting.
//!
//! [`rewrite_document`] walks one JSON document field by field and returns
//! a new value tree in which every reference-bearing field holds an
//! absolute address. Nested objects and arrays are rewritten recursively;
//! metadata blocks are processed like any other object. The input is never
//! mutated.
//!
//! Three resolved types get special handling:
//!
//! - **Blob**: the object's `name` is a path to binary content; the
//!   payload is read through the [`BlobSource`] and attached hex-encoded
//!   under the temporary `_blob_data_` key for the upload driver.
//! - **Reference**: `link`/`pointer` references have their `address`
//!   resolved; `storage` references keep their address verbatim (it is a
//!   local path or a `$<id>`), and relative storage addresses are
//!   rejected.
//! - **Dependency**: the `address` is an external location, never a
//!   document reference, and is kept verbatim.

use std::fs;
use std::path::PathBuf;

use serde_json::{Map, Value};

use dmport_types::{builtin::BuiltinType, core_types, fields, ReferenceType};

use crate::dependencies::DependencyTable;
use crate::error::{ResolveError, ResolveResult};
use crate::reference::{normalize_path, parent_folder, resolve_reference};

/// Read access to the binary content an import can splice into documents.
///
/// `path` is relative to the import root. Returns `Ok(None)` when no
/// content exists at `path`; I/O failures are propagated.
pub trait BlobSource {
    fn read_blob(&self, path: &str) -> std::io::Result<Option<Vec<u8>>>;
}

/// A blob source with no content. Any blob reference resolved against it
/// fails with [`ResolveError::BlobSourceNotFound`].
pub struct NoBlobSource;

impl BlobSource for NoBlobSource {
    fn read_blob(&self, _path: &str) -> std::io::Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

/// Reads blob content from a directory on disk.
///
/// Used by single-entity imports, where blob names resolve against the
/// directory containing the imported file.
pub struct DirectoryBlobSource {
    root: PathBuf,
}

impl DirectoryBlobSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BlobSource for DirectoryBlobSource {
    fn read_blob(&self, path: &str) -> std::io::Result<Option<Vec<u8>>> {
        let full = self.root.join(path);
        if full.is_file() {
            fs::read(full).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Everything a rewrite needs, threaded explicitly through every call.
pub struct RewriteContext<'a> {
    /// The package-scoped dependency table.
    pub dependencies: &'a DependencyTable,
    /// The remote location the import targets.
    pub destination: &'a str,
    /// The referencing file's logical path within the import.
    pub file_path: &'a str,
    /// Where blob payloads are read from.
    pub blobs: &'a dyn BlobSource,
}

/// Rewrite one document, returning a new value tree with every reference
/// resolved and every blob payload spliced in.
///
/// The document itself is treated as a typed object: a missing top-level
/// `type` is a structural error.
pub fn rewrite_document(
    document: &Map<String, Value>,
    ctx: &RewriteContext<'_>,
) -> ResolveResult<Map<String, Value>> {
    rewrite_object("<document>", document, ctx)
}

fn rewrite_object(
    key: &str,
    object: &Map<String, Value>,
    ctx: &RewriteContext<'_>,
) -> ResolveResult<Map<String, Value>> {
    if object.is_empty() {
        return Ok(object.clone());
    }

    let type_value = object
        .get(fields::TYPE)
        .and_then(Value::as_str)
        .ok_or_else(|| ResolveError::MissingType {
            key: key.to_string(),
            file_path: ctx.file_path.to_string(),
        })?;

    // A complex value typed as a builtin holds data, not references.
    if type_value == BuiltinType::Object.as_str() || type_value == BuiltinType::Binary.as_str() {
        return Ok(object.clone());
    }

    let resolved_type = resolve_reference(
        type_value,
        ctx.dependencies,
        ctx.destination,
        Some(ctx.file_path),
    )?;

    let keep_address_verbatim = match resolved_type.as_str() {
        core_types::DEPENDENCY => true,
        core_types::REFERENCE => {
            let reference_type = object
                .get(fields::REFERENCE_TYPE)
                .and_then(Value::as_str)
                .and_then(|raw| raw.parse::<ReferenceType>().ok());
            if reference_type == Some(ReferenceType::Storage) {
                if let Some(address) = object.get(fields::ADDRESS).and_then(Value::as_str) {
                    if address.starts_with('.') {
                        return Err(ResolveError::UnsupportedRelativeStorageReference {
                            address: address.to_string(),
                            file_path: ctx.file_path.to_string(),
                        });
                    }
                }
                true
            } else {
                false
            }
        }
        _ => false,
    };

    let mut rewritten = Map::with_capacity(object.len());
    for (field, value) in object {
        if field == fields::TYPE {
            rewritten.insert(field.clone(), Value::String(resolved_type.clone()));
        } else if field == fields::ADDRESS && keep_address_verbatim {
            rewritten.insert(field.clone(), value.clone());
        } else {
            rewritten.insert(field.clone(), rewrite_field(field, value, ctx)?);
        }
    }

    if resolved_type == core_types::BLOB {
        splice_blob_payload(object, &mut rewritten, ctx)?;
    }

    Ok(rewritten)
}

/// Rewrite one key/value pair. Recurses into objects and arrays; resolves
/// strings under reference-bearing keys; returns everything else as-is.
fn rewrite_field(key: &str, value: &Value, ctx: &RewriteContext<'_>) -> ResolveResult<Value> {
    match value {
        Value::String(reference) => {
            if is_reference_bearing(key) {
                rewrite_reference_string(reference, ctx)
            } else {
                Ok(value.clone())
            }
        }
        Value::Object(object) => Ok(Value::Object(rewrite_object(key, object, ctx)?)),
        Value::Array(items) => {
            let mut rewritten = Vec::with_capacity(items.len());
            for item in items {
                let element = match item {
                    // Order is preserved; each element resolves independently.
                    Value::String(reference) if is_reference_bearing(key) => {
                        rewrite_reference_string(reference, ctx)?
                    }
                    Value::Object(_) | Value::Array(_) => rewrite_field(key, item, ctx)?,
                    other => other.clone(),
                };
                rewritten.push(element);
            }
            Ok(Value::Array(rewritten))
        }
        other => Ok(other.clone()),
    }
}

fn is_reference_bearing(key: &str) -> bool {
    fields::REFERENCE_BEARING_KEYS.contains(&key)
}

fn rewrite_reference_string(reference: &str, ctx: &RewriteContext<'_>) -> ResolveResult<Value> {
    // Empty references and builtin scalar names are data, not addresses.
    if reference.is_empty() || BuiltinType::is_builtin(reference) {
        return Ok(Value::String(reference.to_string()));
    }
    let resolved = resolve_reference(
        reference,
        ctx.dependencies,
        ctx.destination,
        Some(ctx.file_path),
    )?;
    Ok(Value::String(resolved))
}

/// Read the binary content a Blob-typed object names and attach it under
/// the temporary payload key.
fn splice_blob_payload(
    original: &Map<String, Value>,
    rewritten: &mut Map<String, Value>,
    ctx: &RewriteContext<'_>,
) -> ResolveResult<()> {
    let name = original
        .get(fields::NAME)
        .and_then(Value::as_str)
        .ok_or_else(|| ResolveError::MissingField {
            field: fields::NAME.to_string(),
            file_path: ctx.file_path.to_string(),
        })?;

    let folder = parent_folder(ctx.file_path);
    let sibling_path = normalize_path(&format!("{folder}/{name}"));
    let mut content = ctx.blobs.read_blob(&sibling_path)?;
    if content.is_none() && sibling_path != name {
        content = ctx.blobs.read_blob(name)?;
    }
    let content = content.ok_or_else(|| ResolveError::BlobSourceNotFound {
        path: sibling_path,
        file_path: ctx.file_path.to_string(),
    })?;

    tracing::debug!(name, bytes = content.len(), "spliced blob payload");
    rewritten.insert(fields::BLOB_DATA.to_string(), Value::String(hex::encode(content)));
    Ok(())
}
