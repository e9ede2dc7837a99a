use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{domain::errors::PublishResult, ports::messaging::EventPublisher};

/// A message recorded by the in-memory publisher.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    pub topic: String,
    pub data: Bytes,
}

/// In-memory implementation of EventPublisher for testing and development.
/// Every published message is recorded and can be inspected afterwards.
#[derive(Clone)]
pub struct InMemoryPublisher {
    messages: Arc<RwLock<Vec<PublishedMessage>>>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Snapshot of everything published so far, in publish order.
    pub async fn published(&self) -> Vec<PublishedMessage> {
        self.messages.read().await.clone()
    }

    /// Snapshot of the messages published to one topic.
    pub async fn published_to(&self, topic: &str) -> Vec<PublishedMessage> {
        self.messages
            .read()
            .await
            .iter()
            .filter(|m| m.topic == topic)
            .cloned()
            .collect()
    }
}

impl Default for InMemoryPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryPublisher {
    async fn publish(&self, topic: &str, data: Bytes) -> PublishResult<String> {
        let mut messages = self.messages.write().await;
        messages.push(PublishedMessage {
            topic: topic.to_string(),
            data,
        });
        Ok(Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_records_the_message() {
        let publisher = InMemoryPublisher::new();

        let id = publisher
            .publish("output-topic", Bytes::from("hello"))
            .await
            .unwrap();

        assert!(!id.is_empty());
        let messages = publisher.published().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].topic, "output-topic");
        assert_eq!(messages[0].data, Bytes::from("hello"));
    }

    #[tokio::test]
    async fn published_to_filters_by_topic() {
        let publisher = InMemoryPublisher::new();

        publisher
            .publish("output-topic", Bytes::from("a"))
            .await
            .unwrap();
        publisher
            .publish("error-topic", Bytes::from("b"))
            .await
            .unwrap();

        let errors = publisher.published_to("error-topic").await;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].data, Bytes::from("b"));
    }
}
