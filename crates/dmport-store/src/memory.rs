//! In-memory, HashMap-based document store.
//!
//! Intended for tests and embedding. Documents are keyed by their
//! normalized address path; blob and file payloads live in separate maps.
//! Everything sits behind `RwLock`s for safe concurrent access and is
//! cloned on read/write.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::traits::{normalize_address, DocumentMeta, DocumentStore};

/// In-memory [`DocumentStore`] implementation.
///
/// Unlike a real store, missing parent packages are created implicitly on
/// `add_document`; the `create_missing_parents` flag is honored
/// server-side by real implementations.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<String, Value>>,
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    files: RwLock<HashMap<String, Vec<u8>>>,
    data_sources: RwLock<HashMap<String, Value>>,
}

impl InMemoryDocumentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored.
    pub fn document_count(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    /// Number of uploaded blobs.
    pub fn blob_count(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Number of uploaded files.
    pub fn file_count(&self) -> usize {
        self.files.read().expect("lock poisoned").len()
    }

    /// Read an uploaded blob's content.
    pub fn blob_content(&self, data_source: &str, blob_id: &str) -> Option<Vec<u8>> {
        self.blobs
            .read()
            .expect("lock poisoned")
            .get(&payload_key(data_source, blob_id))
            .cloned()
    }

    /// Sorted list of every stored document address.
    pub fn all_addresses(&self) -> Vec<String> {
        let map = self.documents.read().expect("lock poisoned");
        let mut addresses: Vec<String> = map.keys().cloned().collect();
        addresses.sort();
        addresses
    }
}

fn payload_key(data_source: &str, id: &str) -> String {
    format!("{data_source}/{id}")
}

impl DocumentStore for InMemoryDocumentStore {
    fn get_document(&self, address: &str) -> StoreResult<Value> {
        let key = normalize_address(address).to_string();
        let map = self.documents.read().expect("lock poisoned");
        map.get(&key).cloned().ok_or(StoreError::NotFound { address: key })
    }

    fn add_document(
        &self,
        destination: &str,
        document: &Value,
        _create_missing_parents: bool,
    ) -> StoreResult<String> {
        let parent = normalize_address(destination);
        let id = document
            .get("_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let name = document
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(id.as_str());
        let key = format!("{parent}/{name}");

        let mut map = self.documents.write().expect("lock poisoned");
        if map.contains_key(&key) {
            return Err(StoreError::AlreadyExists { address: key });
        }
        map.insert(key, document.clone());
        Ok(id)
    }

    fn upload_blob(&self, data_source: &str, blob_id: &str, content: &[u8]) -> StoreResult<()> {
        self.blobs
            .write()
            .expect("lock poisoned")
            .insert(payload_key(data_source, blob_id), content.to_vec());
        Ok(())
    }

    fn upload_file(&self, data_source: &str, file_id: &str, content: &[u8]) -> StoreResult<()> {
        self.files
            .write()
            .expect("lock poisoned")
            .insert(payload_key(data_source, file_id), content.to_vec());
        Ok(())
    }

    fn get_document_metadata(&self, address: &str) -> StoreResult<DocumentMeta> {
        let document = self.get_document(address)?;
        let dependencies = document
            .get("_meta_")
            .and_then(|meta| meta.get("dependencies"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(DocumentMeta { dependencies })
    }

    fn remove_document(&self, address: &str) -> StoreResult<()> {
        let key = normalize_address(address).to_string();
        let subtree_prefix = format!("{key}/");
        let mut map = self.documents.write().expect("lock poisoned");
        map.retain(|stored, _| stored != &key && !stored.starts_with(&subtree_prefix));
        Ok(())
    }

    fn save_data_source(&self, name: &str, definition: &Value) -> StoreResult<()> {
        self.data_sources
            .write()
            .expect("lock poisoned")
            .insert(name.to_string(), definition.clone());
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDocumentStore")
            .field("document_count", &self.document_count())
            .field("blob_count", &self.blob_count())
            .finish()
    }
}
