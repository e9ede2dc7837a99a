use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{
    errors::StorageResult,
    value_objects::{BucketName, ObjectName, ObjectUri},
};

/// Port for direct blob access.
/// This trait defines the business logic for one-shot reads and writes
#[async_trait]
pub trait BlobService: Send + Sync + 'static {
    /// Download an object fully into memory.
    async fn download(&self, bucket: &BucketName, name: &ObjectName) -> StorageResult<Bytes>;

    /// Download an object and decode it as JSON.
    async fn download_json(
        &self,
        bucket: &BucketName,
        name: &ObjectName,
    ) -> StorageResult<serde_json::Value>;

    /// Upload a blob, returning the URI it was written to.
    async fn upload(
        &self,
        bucket: &BucketName,
        name: &ObjectName,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<ObjectUri>;

    /// Check whether an object exists.
    async fn exists(&self, bucket: &BucketName, name: &ObjectName) -> StorageResult<bool>;
}
