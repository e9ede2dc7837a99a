pub mod messaging;
pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use messaging::EventPublisher;
pub use services::{BlobService, FetchService, RelayService};
pub use storage::{ByteStream, ObjectRead, ObjectStorage};
