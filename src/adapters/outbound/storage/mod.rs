// Storage implementations
mod gcs;
mod object_store_adapter;

// Re-export key types
pub use gcs::{GcsSettings, StoreProvider};
pub use object_store_adapter::{ObjectStoreAdapter, DEFAULT_CHUNK_SIZE};
