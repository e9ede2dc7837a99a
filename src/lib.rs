pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - core business entities and value objects
pub use domain::{
    // Value objects
    BucketName,
    ConfigError,
    DomainValidationError,
    ErrorPolicy,
    // Models
    EventType,
    FetchError,
    FetchNotification,
    FetchOutcome,
    FetchRequest,
    GcpApiError,
    ObjectName,
    ObjectUri,
    PublishError,
    RelayOutcome,
    // Errors
    StorageError,
    StorageEvent,
};

// Port types - interfaces for external systems
pub use ports::{
    BlobService,
    ByteStream,
    // Messaging ports
    EventPublisher,
    FetchService,
    ObjectRead,
    // Storage ports
    ObjectStorage,
    // Service ports
    RelayService,
};

// Service implementations - business logic
pub use services::{BlobServiceImpl, FetchServiceImpl, RelayServiceImpl};

// Application factory and configuration
pub use app::{
    create_app_from_env, create_gcs_app, create_in_memory_app, AppBuilder, AppConfig,
    AppDependencies, AppError, AppServices, FetchConfig, PublisherBackend, StorageBackend,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::{
    gcp::{BigQueryClient, FirestoreClient, TokenSource},
    messaging::{InMemoryPublisher, PubsubPublisher},
    storage::{GcsSettings, ObjectStoreAdapter, StoreProvider},
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_app_from_env, create_in_memory_app, AppBuilder, AppConfig, AppServices, BlobService,
        BucketName, ErrorPolicy, EventPublisher, FetchService, InMemoryPublisher, ObjectName,
        ObjectStorage, ObjectStoreAdapter, ObjectUri, RelayService, StorageEvent, StoreProvider,
    };
}
