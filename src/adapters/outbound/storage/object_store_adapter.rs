use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{StreamExt, TryStreamExt};
use object_store::{
    path::Path as ObjectPath, Attribute, Attributes, ObjectStore as ApacheObjectStore,
    PutMultipartOpts, PutOptions, PutPayload,
};
use tokio::sync::RwLock;

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        value_objects::{BucketName, ObjectName},
    },
    ports::storage::{ByteStream, ObjectRead, ObjectStorage},
};

use super::gcs::StoreProvider;

/// Part size for streaming uploads. Matches the resumable-upload chunk
/// size the storage API recommends for multipart transfers.
pub const DEFAULT_CHUNK_SIZE: usize = 5 * 1024 * 1024;

/// Adapter that implements our ObjectStorage trait using Apache object_store.
///
/// Stores are created lazily per bucket and cached, so repeated operations
/// against the same bucket reuse one client.
pub struct ObjectStoreAdapter {
    provider: StoreProvider,
    chunk_size: usize,
    stores: RwLock<HashMap<String, Arc<dyn ApacheObjectStore>>>,
}

impl ObjectStoreAdapter {
    pub fn new(provider: StoreProvider) -> Self {
        Self::with_chunk_size(provider, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(provider: StoreProvider, chunk_size: usize) -> Self {
        Self {
            provider,
            chunk_size: chunk_size.max(1),
            stores: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create the store for a bucket.
    async fn store_for(&self, bucket: &BucketName) -> StorageResult<Arc<dyn ApacheObjectStore>> {
        {
            let stores = self.stores.read().await;
            if let Some(store) = stores.get(bucket.as_str()) {
                return Ok(Arc::clone(store));
            }
        }

        let store = self.provider.build(bucket)?;

        let mut stores = self.stores.write().await;
        // A concurrent caller may have built one in the meantime; converge
        // on whichever landed first so all handles share state.
        let store = stores
            .entry(bucket.as_str().to_string())
            .or_insert(store)
            .clone();

        Ok(store)
    }
}

#[async_trait]
impl ObjectStorage for ObjectStoreAdapter {
    async fn get(&self, bucket: &BucketName, name: &ObjectName) -> StorageResult<Bytes> {
        let store = self.store_for(bucket).await?;
        let path = ObjectPath::from(name.as_str());

        let result = store.get(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => StorageError::ObjectNotFound {
                bucket: bucket.clone(),
                name: name.clone(),
            },
            _ => StorageError::InfrastructureError {
                message: format!("Failed to get object: {}", e),
                source: Some(e.to_string()),
            },
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::InfrastructureError {
                message: format!("Failed to read object bytes: {}", e),
                source: Some(e.to_string()),
            })?;

        Ok(bytes)
    }

    async fn get_stream(&self, bucket: &BucketName, name: &ObjectName) -> StorageResult<ObjectRead> {
        let store = self.store_for(bucket).await?;
        let path = ObjectPath::from(name.as_str());

        let result = store.get(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => StorageError::ObjectNotFound {
                bucket: bucket.clone(),
                name: name.clone(),
            },
            _ => StorageError::InfrastructureError {
                message: format!("Failed to get object: {}", e),
                source: Some(e.to_string()),
            },
        })?;

        let size = result.meta.size;
        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|v| v.to_string());
        let stream = result.into_stream().map_err(std::io::Error::from).boxed();

        Ok(ObjectRead {
            stream,
            size,
            content_type,
        })
    }

    async fn put(
        &self,
        bucket: &BucketName,
        name: &ObjectName,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<()> {
        let store = self.store_for(bucket).await?;
        let path = ObjectPath::from(name.as_str());

        let mut options = PutOptions::default();
        if let Some(value) = content_type {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, value.to_string().into());
            options.attributes = attributes;
        }

        store
            .put_opts(&path, PutPayload::from(data), options)
            .await
            .map_err(|e| StorageError::InfrastructureError {
                message: format!("Failed to put object: {}", e),
                source: Some(e.to_string()),
            })?;

        Ok(())
    }

    async fn put_stream(
        &self,
        bucket: &BucketName,
        name: &ObjectName,
        mut stream: ByteStream,
        content_type: Option<&str>,
    ) -> StorageResult<u64> {
        let store = self.store_for(bucket).await?;
        let path = ObjectPath::from(name.as_str());

        let mut options = PutMultipartOpts::default();
        if let Some(value) = content_type {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, value.to_string().into());
            options.attributes = attributes;
        }

        let mut upload = store.put_multipart_opts(&path, options).await.map_err(|e| {
            StorageError::InfrastructureError {
                message: format!("Failed to start multipart upload: {}", e),
                source: Some(e.to_string()),
            }
        })?;

        let mut buffer = BytesMut::new();
        let mut total: u64 = 0;
        let mut parts: usize = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    upload.abort().await.ok();
                    return Err(StorageError::TransferAborted {
                        destination: name.clone(),
                        message: format!("Source stream failed: {}", e),
                    });
                }
            };

            total += chunk.len() as u64;
            buffer.extend_from_slice(&chunk);

            while buffer.len() >= self.chunk_size {
                let part = buffer.split_to(self.chunk_size).freeze();
                if let Err(e) = upload.put_part(PutPayload::from(part)).await {
                    upload.abort().await.ok();
                    return Err(StorageError::TransferAborted {
                        destination: name.clone(),
                        message: format!("Failed to upload part: {}", e),
                    });
                }
                parts += 1;
            }
        }

        // Flush the remainder. An object with no data still needs one part
        // so the upload can be completed.
        if !buffer.is_empty() || parts == 0 {
            let part = buffer.split_to(buffer.len()).freeze();
            if let Err(e) = upload.put_part(PutPayload::from(part)).await {
                upload.abort().await.ok();
                return Err(StorageError::TransferAborted {
                    destination: name.clone(),
                    message: format!("Failed to upload part: {}", e),
                });
            }
        }

        if let Err(e) = upload.complete().await {
            upload.abort().await.ok();
            return Err(StorageError::TransferAborted {
                destination: name.clone(),
                message: format!("Failed to complete multipart upload: {}", e),
            });
        }

        Ok(total)
    }

    async fn exists(&self, bucket: &BucketName, name: &ObjectName) -> StorageResult<bool> {
        let store = self.store_for(bucket).await?;
        let path = ObjectPath::from(name.as_str());

        match store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::InfrastructureError {
                message: format!("Failed to check object existence: {}", e),
                source: Some(e.to_string()),
            }),
        }
    }
}
