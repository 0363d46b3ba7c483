//! Single-entity and folder import flows.
//!
//! A single-entity import loads one JSON file, inherits the destination
//! package's remotely registered dependencies, rewrites the document, and
//! uploads it (with blob payloads read from sibling files on disk). A
//! folder import builds a whole package tree from a directory and drives
//! the tree upload, optionally replacing an existing remote target.

use std::path::Path;

use serde_json::{Map, Value};

use dmport_resolve::{
    merge_dependencies, meta_dependencies, rewrite_document, DependencyTable,
    DirectoryBlobSource, RewriteContext,
};
use dmport_store::{normalize_address, DocumentStore, StoreError};
use dmport_tree::{build_package_tree, DirectorySource, Package, TreeError};

use crate::driver::{import_package_tree, upload_blobs_in_document, ImportSummary};
use crate::error::{ImportError, ImportResult};

/// Create any missing packages along `path`, a remote `mkdir -p`.
///
/// Probes the deepest package first; on NotFound it recurses to the
/// parent and creates the missing `Package` documents on the way back
/// down. The data source itself is never created here.
pub fn ensure_package_structure(store: &dyn DocumentStore, path: &str) -> ImportResult<()> {
    let path = normalize_address(path);
    match store.get_document(&format!("dmss://{path}/")) {
        Ok(_) => return Ok(()),
        Err(StoreError::NotFound { .. }) => {}
        Err(error) => return Err(error.into()),
    }

    let Some((parent, name)) = path.rsplit_once('/') else {
        // Data-source level; existence is the server's concern.
        return Ok(());
    };
    if parent.contains('/') {
        ensure_package_structure(store, parent)?;
    }

    let package = Package::new(name, !parent.contains('/'));
    store.add_document(parent, &Value::Object(package.to_document()), false)?;
    tracing::info!(package = name, parent, "created missing package");
    Ok(())
}

/// Import one JSON document at `source_path` into `destination`
/// (`<data-source>/<package>`).
pub fn import_single_entity(
    store: &dyn DocumentStore,
    source_path: &Path,
    destination: &str,
) -> ImportResult<()> {
    let destination = normalize_address(destination).to_string();
    let Some((data_source, package)) = destination.split_once('/') else {
        return Err(ImportError::InvalidDestination { destination });
    };
    ensure_package_structure(store, &destination)?;
    tracing::info!(source = %source_path.display(), destination, "importing entity");

    let file_name = source_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ImportError::InvalidSource {
            path: source_path.display().to_string(),
            reason: "not a file".to_string(),
        })?;
    let bytes = std::fs::read(source_path)?;
    let document: Map<String, Value> =
        serde_json::from_slice(&bytes).map_err(|source| TreeError::MalformedDocument {
            path: file_name.clone(),
            source,
        })?;

    // Merge the destination package's remotely registered dependencies
    // with the document's own declarations.
    let remote = store.get_document_metadata(&destination)?;
    let inherited = merge_dependencies(&remote.dependencies, DependencyTable::new(), &destination)?;
    let dependencies = merge_dependencies(meta_dependencies(&document), inherited, &file_name)?;

    let parent_directory = source_path.parent().unwrap_or_else(|| Path::new("."));
    let blobs = DirectoryBlobSource::new(parent_directory);
    let file_path = format!("{package}/{file_name}");
    let rewritten = rewrite_document(
        &document,
        &RewriteContext {
            dependencies: &dependencies,
            destination: data_source,
            file_path: &file_path,
            blobs: &blobs,
        },
    )?;

    let mut summary = ImportSummary::default();
    let prepared = upload_blobs_in_document(store, data_source, &rewritten, &mut summary)?;
    store.add_document(&destination, &Value::Object(prepared), true)?;
    Ok(())
}

/// Import the directory at `source_path` as a package under
/// `destination`.
///
/// Without `force`, an existing remote target is fatal; with `force` the
/// target is removed first. Non-root destinations have their package
/// structure created and their remote dependencies inherited into the
/// build.
pub fn import_folder_entity(
    store: &dyn DocumentStore,
    source_path: &Path,
    destination: &str,
    force: bool,
) -> ImportResult<ImportSummary> {
    let destination = normalize_address(destination).to_string();
    let folder_name = source_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ImportError::InvalidSource {
            path: source_path.display().to_string(),
            reason: "not a directory".to_string(),
        })?;

    let target = format!("{destination}/{folder_name}");
    match store.get_document(&format!("dmss://{target}")) {
        Ok(_) if !force => return Err(ImportError::TargetAlreadyExists { address: target }),
        Ok(_) => {
            tracing::warn!(%target, "target already exists, replacing");
            store.remove_document(&target)?;
        }
        Err(StoreError::NotFound { .. }) => {}
        Err(error) => return Err(error.into()),
    }

    let destination_is_root = !destination.contains('/');
    let mut dependencies = DependencyTable::new();
    if !destination_is_root {
        ensure_package_structure(store, &destination)?;
        let remote = store.get_document_metadata(&destination)?;
        dependencies = merge_dependencies(&remote.dependencies, dependencies, &destination)?;
    }

    let source = DirectorySource::new(source_path)?;
    let tree = build_package_tree(&source, &destination, destination_is_root, dependencies)?;
    import_package_tree(store, &tree, &destination)
}
