use std::sync::Arc;

use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::memory::InMemory;
use object_store::ObjectStore as ApacheObjectStore;

use crate::domain::{
    errors::{StorageError, StorageResult},
    value_objects::BucketName,
};

/// Connection settings for Google Cloud Storage.
///
/// Both fields are optional: with neither set the builder falls back to
/// application default credentials, which is what runs in production.
#[derive(Debug, Clone, Default)]
pub struct GcsSettings {
    /// Path to a service account JSON key file.
    pub service_account_path: Option<String>,
    /// Override for the storage endpoint, used against emulators.
    pub endpoint: Option<String>,
}

/// Selects the concrete store backing each bucket.
#[derive(Debug, Clone)]
pub enum StoreProvider {
    /// One in-memory store per bucket, for tests and local runs.
    Memory,
    /// Google Cloud Storage with the given settings.
    Gcs(GcsSettings),
}

impl StoreProvider {
    /// Build a store scoped to a single bucket.
    pub fn build(&self, bucket: &BucketName) -> StorageResult<Arc<dyn ApacheObjectStore>> {
        match self {
            StoreProvider::Memory => Ok(Arc::new(InMemory::new())),
            StoreProvider::Gcs(settings) => {
                let mut builder =
                    GoogleCloudStorageBuilder::new().with_bucket_name(bucket.as_str());

                if let Some(path) = &settings.service_account_path {
                    builder = builder.with_service_account_path(path);
                }

                if let Some(endpoint) = &settings.endpoint {
                    builder = builder.with_url(endpoint);
                }

                let store = builder
                    .build()
                    .map_err(|e| StorageError::InfrastructureError {
                        message: format!("Failed to connect to bucket {}: {}", bucket, e),
                        source: Some(e.to_string()),
                    })?;

                Ok(Arc::new(store))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_provider_builds_a_store() {
        let bucket = BucketName::new("test-bucket".to_string()).unwrap();
        let store = StoreProvider::Memory.build(&bucket);
        assert!(store.is_ok());
    }

    #[test]
    fn memory_provider_builds_independent_stores() {
        let bucket = BucketName::new("test-bucket".to_string()).unwrap();
        let provider = StoreProvider::Memory;
        let a = provider.build(&bucket).unwrap();
        let b = provider.build(&bucket).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
