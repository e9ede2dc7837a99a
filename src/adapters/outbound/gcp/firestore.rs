use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::domain::errors::{GcpApiError, GcpApiResult};

use super::auth::TokenSource;

pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com";

const DEFAULT_DATABASE: &str = "(default)";

#[derive(Debug, Deserialize)]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<DocumentRef>,
}

#[derive(Debug, Deserialize)]
struct DocumentRef {
    name: String,
}

/// Client for the Firestore REST API.
pub struct FirestoreClient {
    client: reqwest::Client,
    base_url: String,
    project: String,
    database: String,
    token_source: Arc<TokenSource>,
}

impl FirestoreClient {
    pub fn new(
        client: reqwest::Client,
        project: impl Into<String>,
        token_source: Arc<TokenSource>,
    ) -> Self {
        Self::with_base_url(client, DEFAULT_FIRESTORE_ENDPOINT, project, token_source)
    }

    pub fn with_base_url(
        client: reqwest::Client,
        base_url: impl Into<String>,
        project: impl Into<String>,
        token_source: Arc<TokenSource>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            project: project.into(),
            database: DEFAULT_DATABASE.to_string(),
            token_source,
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    fn documents_root(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents",
            self.base_url, self.project, self.database
        )
    }

    async fn token(&self) -> GcpApiResult<String> {
        self.token_source.token().await
    }

    /// Merge the given fields into a document. Fields outside the update
    /// mask are left untouched; the document is created if absent.
    pub async fn update_document(
        &self,
        collection: &str,
        document: &str,
        fields: &Map<String, Value>,
    ) -> GcpApiResult<()> {
        let token = self.token().await?;

        let url = format!("{}/{}/{}", self.documents_root(), collection, document);
        let mask: Vec<(&str, &str)> = fields
            .keys()
            .map(|key| ("updateMask.fieldPaths", key.as_str()))
            .collect();
        let body = json!({ "fields": to_firestore_fields(fields) });

        let response = self
            .client
            .patch(&url)
            .query(&mask)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| GcpApiError::InfrastructureError {
                message: format!("Failed to reach Firestore: {}", e),
                source: Some(e.to_string()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GcpApiError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    /// Delete every document in a collection, `batch_size` documents per
    /// listing round. Returns the number of documents deleted.
    pub async fn delete_collection(
        &self,
        collection: &str,
        batch_size: usize,
    ) -> GcpApiResult<u64> {
        let mut deleted: u64 = 0;

        loop {
            let documents = self.list_page(collection, batch_size).await?;
            let count = documents.len();

            for document in documents {
                self.delete_by_name(&document.name).await?;
                deleted += 1;
            }

            // A short page means the collection is drained.
            if count < batch_size {
                return Ok(deleted);
            }
        }
    }

    async fn list_page(
        &self,
        collection: &str,
        page_size: usize,
    ) -> GcpApiResult<Vec<DocumentRef>> {
        let token = self.token().await?;

        let url = format!("{}/{}", self.documents_root(), collection);
        let response = self
            .client
            .get(&url)
            .query(&[("pageSize", page_size.to_string())])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| GcpApiError::InfrastructureError {
                message: format!("Failed to reach Firestore: {}", e),
                source: Some(e.to_string()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GcpApiError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ListDocumentsResponse =
            response
                .json()
                .await
                .map_err(|e| GcpApiError::UnexpectedResponse {
                    message: format!("Malformed document list: {}", e),
                })?;

        Ok(parsed.documents)
    }

    async fn delete_by_name(&self, name: &str) -> GcpApiResult<()> {
        let token = self.token().await?;

        let url = format!("{}/v1/{}", self.base_url, name);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| GcpApiError::InfrastructureError {
                message: format!("Failed to reach Firestore: {}", e),
                source: Some(e.to_string()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GcpApiError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Convert a JSON object into Firestore's typed field representation.
pub fn to_firestore_fields(fields: &Map<String, Value>) -> Value {
    let converted: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| (key.clone(), to_firestore_value(value)))
        .collect();
    Value::Object(converted)
}

/// Convert one JSON value into Firestore's typed value representation.
/// Integers become `integerValue` strings, as the API requires.
pub fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(to_firestore_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": to_firestore_fields(map) } }),
    }
}
