//! The tree upload driver.
//!
//! Traverses a fully resolved [`Package`] tree and performs the remote
//! calls, in an order that keeps the store consistent at every step:
//! each package's document goes up before anything it contains, binary
//! files go up before the entities that may reference them by id, and
//! sub-packages follow. Generated ids are captured into the returned
//! summary so callers can correlate tree paths with store ids.
//!
//! Blob payloads spliced under `_blob_data_` are uploaded through the
//! binary path and the carrying object is replaced with
//! `{name, type, _blob_id, size}` before its document is added.

use std::collections::HashMap;

use serde_json::{Map, Value};
use uuid::Uuid;

use dmport_store::{normalize_address, DocumentStore, StoreError};
use dmport_tree::{Package, PackageEntry};
use dmport_types::{core_types, fields};

use crate::error::{ImportError, ImportResult};

/// What one tree upload did.
#[derive(Clone, Debug, Default)]
pub struct ImportSummary {
    pub documents: usize,
    pub files: usize,
    pub blobs: usize,
    /// Generated ids captured during upload, keyed by tree path. Used to
    /// correlate storage references (`$<id>`) with uploaded content.
    pub uploaded_ids: HashMap<String, String>,
}

/// Upload a resolved package tree under `destination`.
pub fn import_package_tree(
    store: &dyn DocumentStore,
    root: &Package,
    destination: &str,
) -> ImportResult<ImportSummary> {
    let destination = normalize_address(destination);
    let data_source = destination.split('/').next().unwrap_or(destination);
    tracing::info!(package = %root.name, destination, "importing package tree");

    let mut summary = ImportSummary::default();
    upload_package(store, root, destination, data_source, &mut summary)?;
    Ok(summary)
}

fn upload_package(
    store: &dyn DocumentStore,
    package: &Package,
    parent_path: &str,
    data_source: &str,
    summary: &mut ImportSummary,
) -> ImportResult<()> {
    // The package document first, so children have a parent to land in.
    store.add_document(parent_path, &Value::Object(package.to_document()), false)?;
    summary.documents += 1;
    let package_path = format!("{parent_path}/{}", package.name);
    summary
        .uploaded_ids
        .insert(package_path.clone(), package.uid.clone());

    // Binary files next, capturing their ids for storage references.
    for child in &package.children {
        if let PackageEntry::Binary(file) = child {
            store.upload_file(data_source, &file.uid, &file.content)?;
            summary.files += 1;
            summary
                .uploaded_ids
                .insert(format!("{package_path}/{}", file.name), file.uid.clone());
        }
    }

    // Entities, with any spliced blob payloads uploaded first.
    for child in &package.children {
        if let PackageEntry::Entity(entity) = child {
            let document = upload_blobs_in_document(store, data_source, &entity.content, summary)?;
            store.add_document(&package_path, &Value::Object(document), false)?;
            summary.documents += 1;
            summary
                .uploaded_ids
                .insert(format!("{package_path}/{}", entity.name), entity.uid.clone());
        }
    }

    // Sub-packages last.
    for child in &package.children {
        if let PackageEntry::Package(sub_package) = child {
            upload_package(store, sub_package, &package_path, data_source, summary)?;
        }
    }
    Ok(())
}

/// Upload every spliced blob payload in `document`, replacing each
/// carrying object with its uploaded form.
///
/// A blob id that already exists remotely is accepted as uploaded; the
/// payload is content the store already holds.
pub(crate) fn upload_blobs_in_document(
    store: &dyn DocumentStore,
    data_source: &str,
    document: &Map<String, Value>,
    summary: &mut ImportSummary,
) -> ImportResult<Map<String, Value>> {
    let is_blob = document.get(fields::TYPE).and_then(Value::as_str) == Some(core_types::BLOB);
    if is_blob {
        if let Some(encoded) = document.get(fields::BLOB_DATA).and_then(Value::as_str) {
            return upload_one_blob(store, data_source, document, encoded, summary);
        }
    }

    let mut uploaded = Map::with_capacity(document.len());
    for (key, value) in document {
        // Metadata never carries blob payloads.
        if key == fields::META {
            uploaded.insert(key.clone(), value.clone());
            continue;
        }
        let replacement = match value {
            Value::Object(object) if !object.is_empty() => {
                Value::Object(upload_blobs_in_document(store, data_source, object, summary)?)
            }
            Value::Array(items) => {
                let mut rewritten = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Object(object) if !object.is_empty() => rewritten.push(Value::Object(
                            upload_blobs_in_document(store, data_source, object, summary)?,
                        )),
                        other => rewritten.push(other.clone()),
                    }
                }
                Value::Array(rewritten)
            }
            other => other.clone(),
        };
        uploaded.insert(key.clone(), replacement);
    }
    Ok(uploaded)
}

fn upload_one_blob(
    store: &dyn DocumentStore,
    data_source: &str,
    document: &Map<String, Value>,
    encoded: &str,
    summary: &mut ImportSummary,
) -> ImportResult<Map<String, Value>> {
    let name = document
        .get(fields::NAME)
        .and_then(Value::as_str)
        .unwrap_or_default();
    let content = hex::decode(encoded).map_err(|_| ImportError::InvalidBlobPayload {
        name: name.to_string(),
    })?;
    let blob_id = document
        .get(fields::BLOB_ID)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    match store.upload_blob(data_source, &blob_id, &content) {
        Ok(()) => {}
        // Recoverable: the store already holds this payload.
        Err(StoreError::AlreadyExists { .. }) => {
            tracing::warn!(blob_id, "blob already exists, keeping remote content");
        }
        Err(error) => return Err(error.into()),
    }
    summary.blobs += 1;

    let stem = name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name);
    let mut uploaded = Map::new();
    uploaded.insert(fields::NAME.to_string(), Value::String(stem.to_string()));
    uploaded.insert(
        fields::TYPE.to_string(),
        Value::String(core_types::BLOB.to_string()),
    );
    uploaded.insert(fields::BLOB_ID.to_string(), Value::String(blob_id));
    uploaded.insert(fields::SIZE.to_string(), Value::from(content.len()));
    Ok(uploaded)
}
