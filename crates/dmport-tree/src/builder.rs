//! Building a resolved package tree from a flat source listing.
//!
//! Construction runs in two passes. The first pass reconstructs the
//! folder hierarchy, attaches every document and binary file to its node,
//! and folds each file's `_meta_.dependencies` into one package-scoped
//! table. The second pass rewrites every document (and every package's
//! metadata) against the completed table, so resolution never depends on
//! the order files were encountered in.
//!
//! Directory nodes are created on demand: a folder that only appears as
//! an intermediate path segment still gets its `Package` node, and a
//! folder listed explicitly after its files reuses the node already made
//! for them.

use serde_json::{Map, Value};

use dmport_resolve::{
    merge_dependencies, meta_dependencies, rewrite_document, BlobSource, DependencyTable,
    RewriteContext,
};
use dmport_types::fields;

use crate::error::{TreeError, TreeResult};
use crate::node::{BinaryFile, Entity, Package, PackageEntry};
use crate::source::{ImportSource, SourceBlobs};

/// Conventional name of the package-metadata sentinel file.
const PACKAGE_SENTINEL: &str = "package.json";

/// Build a fully reference-resolved [`Package`] tree from `source`.
///
/// `destination` is the remote location the import targets. `is_root`
/// marks the produced package as the top-level package of the operation.
/// `extra_dependencies` seeds the dependency table, e.g. with declarations
/// inherited from a remote parent package; they conflict-screen against
/// the root `package.json` like any other declaration.
pub fn build_package_tree(
    source: &dyn ImportSource,
    destination: &str,
    is_root: bool,
    extra_dependencies: DependencyTable,
) -> TreeResult<Package> {
    let entries = source.entries();
    let first = entries.first().ok_or(TreeError::EmptySource)?;
    let root_folder = first
        .path
        .split('/')
        .next()
        .unwrap_or(first.path.as_str())
        .to_string();

    // Seed the root package from the sentinel file, when present.
    let sentinel_path = format!("{root_folder}/{PACKAGE_SENTINEL}");
    let mut dependencies = extra_dependencies;
    let mut root = Package::new(&root_folder, is_root);
    if let Some(bytes) = source.read(&sentinel_path)? {
        let document = parse_document(PACKAGE_SENTINEL, &bytes)?;
        if let Some(name) = document.get(fields::NAME).and_then(Value::as_str) {
            root.name = name.to_string();
        }
        root.meta = document.get(fields::META).and_then(Value::as_object).cloned();
        dependencies =
            merge_dependencies(meta_dependencies(&document), dependencies, PACKAGE_SENTINEL)?;
    }
    tracing::debug!(package = %root.name, entries = entries.len(), "building package tree");

    for entry in &entries {
        if entry.path == root_folder || entry.path == sentinel_path {
            continue;
        }
        let Some(relative) = entry
            .path
            .strip_prefix(&root_folder)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            tracing::warn!(path = %entry.path, "entry outside the root folder, skipped");
            continue;
        };
        if relative.is_empty() {
            continue;
        }

        let segments: Vec<&str> = relative.split('/').collect();
        if entry.is_dir {
            root.ensure_package_path(&segments);
            continue;
        }

        let (folders, file_name) = segments.split_at(segments.len() - 1);
        let file_name = file_name[0];
        let content = source
            .read(&entry.path)?
            .ok_or_else(|| TreeError::MissingEntry {
                path: entry.path.clone(),
            })?;

        if file_name.ends_with(".json") {
            let document = parse_document(relative, &content)?;
            dependencies = merge_dependencies(meta_dependencies(&document), dependencies, relative)?;
            let parent = root.ensure_package_path(folders);
            if file_name.ends_with(PACKAGE_SENTINEL) {
                // Sub-package metadata is merged into the enclosing
                // package, not appended as a content entity.
                parent.meta = document.get(fields::META).and_then(Value::as_object).cloned();
            } else {
                parent
                    .children
                    .push(PackageEntry::Entity(Entity::from_document(file_name, document)));
            }
        } else {
            let parent = root.ensure_package_path(folders);
            parent
                .children
                .push(PackageEntry::Binary(BinaryFile::new(file_name, content)));
        }
    }

    // Second pass over the completed tree: rewrite every document and
    // package metadata block against the final dependency table.
    let blobs = SourceBlobs::new(source);
    let root_path = root.name.clone();
    rewrite_tree(&mut root, &root_path, &dependencies, destination, &blobs)?;

    Ok(root)
}

fn parse_document(path: &str, bytes: &[u8]) -> TreeResult<Map<String, Value>> {
    serde_json::from_slice(bytes).map_err(|source| TreeError::MalformedDocument {
        path: path.to_string(),
        source,
    })
}

fn rewrite_tree(
    package: &mut Package,
    path: &str,
    dependencies: &DependencyTable,
    destination: &str,
    blobs: &dyn BlobSource,
) -> TreeResult<()> {
    if let Some(meta) = package.meta.take() {
        let file_path = format!("{path}/{PACKAGE_SENTINEL}");
        let ctx = RewriteContext {
            dependencies,
            destination,
            file_path: &file_path,
            blobs,
        };
        package.meta = Some(rewrite_document(&meta, &ctx)?);
    }

    for child in &mut package.children {
        match child {
            PackageEntry::Entity(entity) => {
                let file_path = format!("{path}/{}", entity.file_name);
                let ctx = RewriteContext {
                    dependencies,
                    destination,
                    file_path: &file_path,
                    blobs,
                };
                entity.content = rewrite_document(&entity.content, &ctx)?;
            }
            PackageEntry::Package(sub_package) => {
                let child_path = format!("{path}/{}", sub_package.name);
                rewrite_tree(sub_package, &child_path, dependencies, destination, blobs)?;
            }
            PackageEntry::Binary(_) => {}
        }
    }
    Ok(())
}
