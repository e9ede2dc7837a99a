use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{ErrorPolicy, RelayOutcome, StorageEvent},
        value_objects::{BucketName, ObjectName, ObjectUri},
    },
    ports::{messaging::EventPublisher, services::RelayService, storage::ObjectStorage},
};

/// Implementation of RelayService for moving finalized objects into the
/// destination bucket
#[derive(Clone)]
pub struct RelayServiceImpl {
    storage: Arc<dyn ObjectStorage>,
    publisher: Arc<dyn EventPublisher>,
    destination: BucketName,
    policy: ErrorPolicy,
}

impl RelayServiceImpl {
    /// Create a new RelayServiceImpl instance
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        publisher: Arc<dyn EventPublisher>,
        destination: BucketName,
        policy: ErrorPolicy,
    ) -> Self {
        Self {
            storage,
            publisher,
            destination,
            policy,
        }
    }

    /// Destination name for a moved object: `{source bucket}/{source object}`.
    /// Prefixing with the source bucket keeps objects from different sources
    /// apart inside the one destination bucket.
    fn destination_name(&self, event: &StorageEvent) -> StorageResult<ObjectName> {
        ObjectName::new(format!("{}/{}", event.bucket_id, event.object_id)).map_err(|e| {
            StorageError::ValidationError {
                message: e.to_string(),
            }
        })
    }

    async fn transfer(&self, event: &StorageEvent) -> StorageResult<RelayOutcome> {
        let name = self.destination_name(event)?;

        let read = self
            .storage
            .get_stream(&event.bucket_id, &event.object_id)
            .await?;
        let content_type = read.content_type.clone();

        let bytes = self
            .storage
            .put_stream(&self.destination, &name, read.stream, content_type.as_deref())
            .await?;

        let destination = ObjectUri::new(self.destination.clone(), name);
        info!(
            source = %event.source_uri(),
            destination = %destination,
            bytes,
            "Object moved"
        );

        Ok(RelayOutcome::Moved { destination, bytes })
    }

    /// Route a transfer failure through the configured error policy.
    async fn apply_policy(
        &self,
        event: &StorageEvent,
        error: StorageError,
    ) -> StorageResult<RelayOutcome> {
        match &self.policy {
            ErrorPolicy::Suppress => {
                error!(
                    source = %event.source_uri(),
                    %error,
                    "Transfer failed; error suppressed so the event is not redelivered"
                );
                Ok(RelayOutcome::Suppressed {
                    error: error.to_string(),
                })
            }
            ErrorPolicy::Propagate => Err(error),
            ErrorPolicy::DeadLetter { topic } => {
                let payload = json!({
                    "bucketId": event.bucket_id.as_str(),
                    "objectId": event.object_id.as_str(),
                    "eventType": event.event_type.as_str(),
                    "error": error.to_string(),
                });

                // Publish failures are logged only; the event is
                // acknowledged either way.
                if let Err(publish_error) = self
                    .publisher
                    .publish(topic, Bytes::from(payload.to_string()))
                    .await
                {
                    error!(topic, %publish_error, "Failed to publish dead letter");
                }

                error!(
                    source = %event.source_uri(),
                    %error,
                    topic,
                    "Transfer failed; event dead-lettered"
                );
                Ok(RelayOutcome::Suppressed {
                    error: error.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl RelayService for RelayServiceImpl {
    async fn handle_event(&self, event: StorageEvent) -> StorageResult<RelayOutcome> {
        info!(
            bucket = %event.bucket_id,
            object = %event.object_id,
            event_type = %event.event_type,
            "Processing storage event"
        );

        if !event.event_type.is_finalize() {
            info!(event_type = %event.event_type, "Event type does not trigger a move; skipping");
            return Ok(RelayOutcome::Skipped {
                event_type: event.event_type,
            });
        }

        match self.transfer(&event).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => self.apply_policy(&event, error).await,
        }
    }
}
