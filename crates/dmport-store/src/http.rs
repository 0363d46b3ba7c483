//! Blocking HTTP client against a running document-store instance.
//!
//! Endpoint layout follows the store's REST API: documents under
//! `/api/documents/`, binary payloads under `/api/blobs/` and
//! `/api/files/`, metadata export under `/api/export/meta/`. An access
//! token, when configured, travels in the `Access-Key` header.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::traits::{normalize_address, DocumentMeta, DocumentStore};

/// HTTP [`DocumentStore`] implementation.
pub struct HttpDocumentStore {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl HttpDocumentStore {
    /// Create a client for the store at `base_url` (e.g.
    /// `http://localhost:5000`).
    pub fn new(base_url: &str, token: Option<String>) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|error| StoreError::Transport {
                message: error.to_string(),
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn url(&self, endpoint: &str, address: &str) -> String {
        format!("{}/api/{endpoint}/{address}", self.base_url)
    }

    fn request(
        &self,
        builder: reqwest::blocking::RequestBuilder,
        address: &str,
    ) -> StoreResult<Response> {
        let builder = match &self.token {
            Some(token) => builder.header("Access-Key", token),
            None => builder,
        };
        let response = builder.send().map_err(|error| StoreError::Transport {
            message: error.to_string(),
        })?;
        classify_response(response, address)
    }
}

/// Map an HTTP response onto the store error taxonomy.
fn classify_response(response: Response, address: &str) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(classify_failure(status, &body, address))
}

fn classify_failure(status: StatusCode, body: &str, address: &str) -> StoreError {
    match status {
        StatusCode::NOT_FOUND => StoreError::NotFound {
            address: address.to_string(),
        },
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT if body.contains("already exists") => {
            StoreError::AlreadyExists {
                address: address.to_string(),
            }
        }
        _ => StoreError::Rejected {
            address: address.to_string(),
            message: format!("{status}: {body}"),
        },
    }
}

impl DocumentStore for HttpDocumentStore {
    fn get_document(&self, address: &str) -> StoreResult<Value> {
        let address = normalize_address(address);
        let response = self.request(self.client.get(self.url("documents", address)), address)?;
        response.json().map_err(|error| StoreError::Transport {
            message: error.to_string(),
        })
    }

    fn add_document(
        &self,
        destination: &str,
        document: &Value,
        create_missing_parents: bool,
    ) -> StoreResult<String> {
        let destination = normalize_address(destination);
        tracing::debug!(destination, "uploading document");
        let response = self.request(
            self.client
                .post(self.url("documents", destination))
                .query(&[("create_missing_parents", create_missing_parents)])
                .json(document),
            destination,
        )?;
        let body: Value = response.json().map_err(|error| StoreError::Transport {
            message: error.to_string(),
        })?;
        // The store answers either a bare id string or {"uid": "..."}.
        match &body {
            Value::String(id) => Ok(id.clone()),
            Value::Object(map) => map
                .get("uid")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| StoreError::Rejected {
                    address: destination.to_string(),
                    message: format!("unexpected add response: {body}"),
                }),
            other => Err(StoreError::Rejected {
                address: destination.to_string(),
                message: format!("unexpected add response: {other}"),
            }),
        }
    }

    fn upload_blob(&self, data_source: &str, blob_id: &str, content: &[u8]) -> StoreResult<()> {
        let address = format!("{data_source}/{blob_id}");
        self.request(
            self.client
                .put(self.url("blobs", &address))
                .body(content.to_vec()),
            &address,
        )?;
        Ok(())
    }

    fn upload_file(&self, data_source: &str, file_id: &str, content: &[u8]) -> StoreResult<()> {
        let address = format!("{data_source}/{file_id}");
        self.request(
            self.client
                .put(self.url("files", &address))
                .body(content.to_vec()),
            &address,
        )?;
        Ok(())
    }

    fn get_document_metadata(&self, address: &str) -> StoreResult<DocumentMeta> {
        let address = normalize_address(address);
        let response = self.request(self.client.get(self.url("export/meta", address)), address)?;
        response.json().map_err(|error| StoreError::Transport {
            message: error.to_string(),
        })
    }

    fn remove_document(&self, address: &str) -> StoreResult<()> {
        let address = normalize_address(address);
        match self.request(self.client.delete(self.url("documents", address)), address) {
            Ok(_) => Ok(()),
            // Idempotent delete: a missing target is success.
            Err(StoreError::NotFound { .. }) => Ok(()),
            Err(error) => Err(error),
        }
    }

    fn save_data_source(&self, name: &str, definition: &Value) -> StoreResult<()> {
        self.request(
            self.client
                .post(self.url("data-sources", name))
                .json(definition),
            name,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_composition() {
        let store = HttpDocumentStore::new("http://localhost:5000/", None).unwrap();
        assert_eq!(
            store.url("documents", "ds/Root"),
            "http://localhost:5000/api/documents/ds/Root"
        );
        assert_eq!(
            store.url("export/meta", "ds/Root"),
            "http://localhost:5000/api/export/meta/ds/Root"
        );
    }

    #[test]
    fn not_found_status_maps_to_not_found() {
        let error = classify_failure(StatusCode::NOT_FOUND, "", "ds/x");
        assert!(matches!(error, StoreError::NotFound { address } if address == "ds/x"));
    }

    #[test]
    fn already_exists_body_maps_to_already_exists() {
        let error = classify_failure(
            StatusCode::BAD_REQUEST,
            r#"{"type": "BadRequestException", "message": "document already exists"}"#,
            "ds/x",
        );
        assert!(matches!(error, StoreError::AlreadyExists { .. }));
    }

    #[test]
    fn other_bad_request_maps_to_rejected() {
        let error = classify_failure(StatusCode::BAD_REQUEST, "validation failed", "ds/x");
        assert!(matches!(error, StoreError::Rejected { .. }));
    }
}
