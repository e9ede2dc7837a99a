use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::PublishResult;

/// Port for topic-based message publishing.
/// This abstracts the actual messaging backend (Pub/Sub, in-memory, etc.)
#[async_trait]
pub trait EventPublisher: Send + Sync + 'static {
    /// Publish a payload to a topic, returning the backend's message id
    async fn publish(&self, topic: &str, data: Bytes) -> PublishResult<String>;
}
