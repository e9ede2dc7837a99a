// Messaging implementations
mod in_memory_publisher;
mod pubsub_publisher;

// Re-export key types
pub use in_memory_publisher::{InMemoryPublisher, PublishedMessage};
pub use pubsub_publisher::{PubsubPublisher, DEFAULT_PUBSUB_ENDPOINT};
