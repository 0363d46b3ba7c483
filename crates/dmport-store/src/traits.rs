//! The document-store interface the import pipeline drives.

use serde::Deserialize;
use serde_json::Value;

use crate::error::StoreResult;

/// Metadata registered on a remote document, as returned by
/// [`DocumentStore::get_document_metadata`]. Dependency declarations are
/// kept raw; the resolver parses and conflict-screens them on merge.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DocumentMeta {
    #[serde(default)]
    pub dependencies: Vec<Value>,
}

/// Strip the internal-store scheme and surrounding slashes from an
/// address, leaving the bare `data-source/package/...` path.
pub fn normalize_address(address: &str) -> &str {
    address
        .strip_prefix("dmss://")
        .unwrap_or(address)
        .trim_matches('/')
}

/// A remote document store with plain CRUD semantics.
///
/// Addresses are accepted with or without the `dmss://` scheme. All
/// implementations must satisfy these invariants:
/// - Reads of missing documents return [`StoreError::NotFound`], never a
///   default value.
/// - `remove_document` is idempotent on missing targets: deleting a
///   document that does not exist is success.
/// - Uploads are idempotent in intent but not guaranteed idempotent by
///   the store; a duplicate `add_document` surfaces
///   [`StoreError::AlreadyExists`].
///
/// [`StoreError::NotFound`]: crate::error::StoreError::NotFound
/// [`StoreError::AlreadyExists`]: crate::error::StoreError::AlreadyExists
pub trait DocumentStore: Send + Sync {
    /// Read the document at `address`.
    fn get_document(&self, address: &str) -> StoreResult<Value>;

    /// Whether a document exists at `address`.
    ///
    /// Default implementation reads the document and maps `NotFound` to
    /// `false`.
    fn document_exists(&self, address: &str) -> StoreResult<bool> {
        match self.get_document(address) {
            Ok(_) => Ok(true),
            Err(crate::error::StoreError::NotFound { .. }) => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Add `document` under the parent at `destination` and return the
    /// stored document's id.
    fn add_document(
        &self,
        destination: &str,
        document: &Value,
        create_missing_parents: bool,
    ) -> StoreResult<String>;

    /// Upload binary blob content under `blob_id`.
    fn upload_blob(&self, data_source: &str, blob_id: &str, content: &[u8]) -> StoreResult<()>;

    /// Upload an uncontained file under `file_id`.
    fn upload_file(&self, data_source: &str, file_id: &str, content: &[u8]) -> StoreResult<()>;

    /// The metadata (dependency declarations) registered on the document
    /// at `address`.
    fn get_document_metadata(&self, address: &str) -> StoreResult<DocumentMeta>;

    /// Remove the document at `address`, and everything contained in it.
    /// Removing a missing document is success.
    fn remove_document(&self, address: &str) -> StoreResult<()>;

    /// Create or update a data source definition.
    fn save_data_source(&self, name: &str, definition: &Value) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_scheme_and_slashes() {
        assert_eq!(normalize_address("dmss://ds/Root/"), "ds/Root");
        assert_eq!(normalize_address("ds/Root"), "ds/Root");
        assert_eq!(normalize_address("/ds/Root/"), "ds/Root");
    }

    #[test]
    fn document_meta_deserializes_with_defaults() {
        let meta: DocumentMeta = serde_json::from_str("{}").unwrap();
        assert!(meta.dependencies.is_empty());
        let meta: DocumentMeta =
            serde_json::from_str(r#"{"dependencies": [{"alias": "CORE"}]}"#).unwrap();
        assert_eq!(meta.dependencies.len(), 1);
    }
}
