use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    domain::{
        errors::FetchError,
        models::{FetchNotification, FetchOutcome, FetchRequest, FetchStatus},
        value_objects::ObjectUri,
    },
    ports::{messaging::EventPublisher, services::FetchService, storage::ObjectStorage},
};

/// Implementation of FetchService for mirroring remote files into storage.
///
/// Every attempt ends with a notification on the output or error topic;
/// failures are reported there instead of being raised, so the triggering
/// message is never redelivered.
#[derive(Clone)]
pub struct FetchServiceImpl {
    storage: Arc<dyn ObjectStorage>,
    publisher: Arc<dyn EventPublisher>,
    http: reqwest::Client,
    output_topic: String,
    error_topic: String,
}

impl FetchServiceImpl {
    /// Create a new FetchServiceImpl instance
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        publisher: Arc<dyn EventPublisher>,
        http: reqwest::Client,
        output_topic: impl Into<String>,
        error_topic: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            publisher,
            http,
            output_topic: output_topic.into(),
            error_topic: error_topic.into(),
        }
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<(ObjectUri, u64), FetchError> {
        let resolved = request.resolve(Utc::now().date_naive()).map_err(|e| {
            FetchError::MalformedRequest {
                message: e.to_string(),
            }
        })?;

        let response = self.http.get(&resolved.url).send().await.map_err(|e| {
            FetchError::Transport {
                url: resolved.url.clone(),
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: resolved.url.clone(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let stream = response
            .bytes_stream()
            .map_err(std::io::Error::other)
            .boxed();

        let bytes = self
            .storage
            .put_stream(
                &resolved.bucket,
                &resolved.destination,
                stream,
                content_type.as_deref(),
            )
            .await?;

        Ok((
            ObjectUri::new(resolved.bucket, resolved.destination),
            bytes,
        ))
    }

    /// Publish the notification to the topic matching its status. Publish
    /// failures are logged, never raised.
    async fn notify(&self, notification: &FetchNotification) {
        let topic = match notification.status {
            FetchStatus::Fetched => &self.output_topic,
            FetchStatus::Failed => &self.error_topic,
        };

        match serde_json::to_vec(notification) {
            Ok(payload) => {
                if let Err(error) = self.publisher.publish(topic, Bytes::from(payload)).await {
                    warn!(topic, %error, "Failed to publish fetch notification");
                }
            }
            Err(error) => warn!(%error, "Failed to encode fetch notification"),
        }
    }
}

#[async_trait]
impl FetchService for FetchServiceImpl {
    async fn handle_message(&self, payload: &[u8]) -> FetchOutcome {
        match serde_json::from_slice::<FetchRequest>(payload) {
            Ok(request) => self.handle_request(request).await,
            Err(decode_error) => {
                let error = format!("Malformed fetch request: {}", decode_error);
                error!(%error, "Discarding fetch message");
                self.notify(&FetchNotification::failed(None, error.clone()))
                    .await;
                FetchOutcome::Failed { error }
            }
        }
    }

    async fn handle_request(&self, request: FetchRequest) -> FetchOutcome {
        let source_url = request.source_url.clone();
        info!(source = %source_url, bucket = %request.bucket, "Processing fetch request");

        match self.fetch(&request).await {
            Ok((uri, bytes)) => {
                info!(source = %source_url, %uri, bytes, "File fetched into storage");
                self.notify(&FetchNotification::fetched(source_url, uri.to_string()))
                    .await;
                FetchOutcome::Fetched { uri, bytes }
            }
            Err(error) => {
                error!(source = %source_url, %error, "Fetch failed");
                self.notify(&FetchNotification::failed(
                    Some(source_url),
                    error.to_string(),
                ))
                .await;
                FetchOutcome::Failed {
                    error: error.to_string(),
                }
            }
        }
    }
}
