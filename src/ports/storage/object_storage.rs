use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::{
    errors::StorageResult,
    value_objects::{BucketName, ObjectName},
};

/// Byte stream handed across the storage port.
///
/// Items carry `std::io::Error` so streams from storage backends and HTTP
/// bodies share one shape and plug into `tokio_util::io::StreamReader`.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// An object opened for streaming reads
pub struct ObjectRead {
    pub stream: ByteStream,
    pub size: u64,
    pub content_type: Option<String>,
}

/// Port for bucket-addressed object storage.
/// This abstracts the actual storage backend (GCS, in-memory, etc.)
#[async_trait]
pub trait ObjectStorage: Send + Sync + 'static {
    /// Fetch a whole object
    async fn get(&self, bucket: &BucketName, name: &ObjectName) -> StorageResult<Bytes>;

    /// Open a read stream over an object
    async fn get_stream(
        &self,
        bucket: &BucketName,
        name: &ObjectName,
    ) -> StorageResult<ObjectRead>;

    /// Write a whole object
    async fn put(
        &self,
        bucket: &BucketName,
        name: &ObjectName,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<()>;

    /// Pipe a stream into an object through a bounded buffer.
    ///
    /// The write is multipart under the hood; on any failure the upload is
    /// aborted so no partial object becomes visible. Returns the number of
    /// bytes written.
    async fn put_stream(
        &self,
        bucket: &BucketName,
        name: &ObjectName,
        stream: ByteStream,
        content_type: Option<&str>,
    ) -> StorageResult<u64>;

    /// Check if an object exists
    async fn exists(&self, bucket: &BucketName, name: &ObjectName) -> StorageResult<bool>;
}
