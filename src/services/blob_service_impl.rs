use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tracing::info;

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        value_objects::{BucketName, ObjectName, ObjectUri},
    },
    ports::{services::BlobService, storage::ObjectStorage},
};

/// Content type applied to uploads when the caller does not name one.
/// Most of what flows through here is exported tabular data.
pub const DEFAULT_CONTENT_TYPE: &str = "text/csv";

/// Implementation of BlobService for one-shot reads and writes
#[derive(Clone)]
pub struct BlobServiceImpl {
    storage: Arc<dyn ObjectStorage>,
}

impl BlobServiceImpl {
    /// Create a new BlobServiceImpl instance
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl BlobService for BlobServiceImpl {
    async fn download(&self, bucket: &BucketName, name: &ObjectName) -> StorageResult<Bytes> {
        self.storage.get(bucket, name).await
    }

    async fn download_json(
        &self,
        bucket: &BucketName,
        name: &ObjectName,
    ) -> StorageResult<serde_json::Value> {
        let data = self.storage.get(bucket, name).await?;

        serde_json::from_slice(&data).map_err(|e| StorageError::DecodeError {
            name: name.clone(),
            message: e.to_string(),
        })
    }

    async fn upload(
        &self,
        bucket: &BucketName,
        name: &ObjectName,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<ObjectUri> {
        let content_type = content_type.unwrap_or(DEFAULT_CONTENT_TYPE);
        let size = data.len();

        self.storage
            .put(bucket, name, data, Some(content_type))
            .await?;

        let uri = ObjectUri::new(bucket.clone(), name.clone());
        info!(%uri, size, content_type, "Blob uploaded");

        Ok(uri)
    }

    async fn exists(&self, bucket: &BucketName, name: &ObjectName) -> StorageResult<bool> {
        self.storage.exists(bucket, name).await
    }
}
