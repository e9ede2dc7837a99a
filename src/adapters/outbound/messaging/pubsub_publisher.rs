use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

use crate::{
    adapters::outbound::gcp::TokenSource,
    domain::errors::{PublishError, PublishResult},
    ports::messaging::EventPublisher,
};

pub const DEFAULT_PUBSUB_ENDPOINT: &str = "https://pubsub.googleapis.com";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

/// Publisher backed by the Pub/Sub REST API.
///
/// Topics are addressed by short name and resolved against the configured
/// project. Payloads are base64-encoded as the API requires.
pub struct PubsubPublisher {
    client: reqwest::Client,
    base_url: String,
    project: String,
    token_source: Arc<TokenSource>,
}

impl PubsubPublisher {
    pub fn new(
        client: reqwest::Client,
        project: impl Into<String>,
        token_source: Arc<TokenSource>,
    ) -> Self {
        Self::with_base_url(client, DEFAULT_PUBSUB_ENDPOINT, project, token_source)
    }

    pub fn with_base_url(
        client: reqwest::Client,
        base_url: impl Into<String>,
        project: impl Into<String>,
        token_source: Arc<TokenSource>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            project: project.into(),
            token_source,
        }
    }
}

#[async_trait]
impl EventPublisher for PubsubPublisher {
    async fn publish(&self, topic: &str, data: Bytes) -> PublishResult<String> {
        let token =
            self.token_source
                .token()
                .await
                .map_err(|e| PublishError::InfrastructureError {
                    message: format!("Failed to obtain access token: {}", e),
                    source: Some(e.to_string()),
                })?;

        let url = format!(
            "{}/v1/projects/{}/topics/{}:publish",
            self.base_url, self.project, topic
        );
        let body = json!({
            "messages": [{ "data": BASE64.encode(&data) }]
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| PublishError::InfrastructureError {
                message: format!("Failed to reach Pub/Sub: {}", e),
                source: Some(e.to_string()),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PublishError::TopicNotFound {
                topic: topic.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::InfrastructureError {
                message: format!("Pub/Sub returned status {}: {}", status, body),
                source: None,
            });
        }

        let parsed: PublishResponse =
            response
                .json()
                .await
                .map_err(|e| PublishError::InfrastructureError {
                    message: format!("Malformed publish response: {}", e),
                    source: Some(e.to_string()),
                })?;

        parsed
            .message_ids
            .into_iter()
            .next()
            .ok_or_else(|| PublishError::EmptyResponse {
                topic: topic.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn publisher(server: &mockito::Server) -> PubsubPublisher {
        PubsubPublisher::with_base_url(
            reqwest::Client::new(),
            server.url(),
            "test-project",
            Arc::new(TokenSource::fixed("test-token")),
        )
    }

    #[tokio::test]
    async fn publish_sends_base64_payload_and_returns_message_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/projects/test-project/topics/output-topic:publish")
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::Json(json!({
                "messages": [{ "data": BASE64.encode("hello") }]
            })))
            .with_status(200)
            .with_body(json!({ "messageIds": ["12345"] }).to_string())
            .create_async()
            .await;

        let id = publisher(&server)
            .publish("output-topic", Bytes::from("hello"))
            .await
            .unwrap();

        assert_eq!(id, "12345");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_topic_is_reported_as_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/projects/test-project/topics/gone:publish")
            .with_status(404)
            .with_body(json!({ "error": { "code": 404 } }).to_string())
            .create_async()
            .await;

        let err = publisher(&server)
            .publish("gone", Bytes::from("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::TopicNotFound { .. }));
    }

    #[tokio::test]
    async fn empty_message_id_list_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/projects/test-project/topics/output-topic:publish")
            .with_status(200)
            .with_body(json!({ "messageIds": [] }).to_string())
            .create_async()
            .await;

        let err = publisher(&server)
            .publish("output-topic", Bytes::from("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::EmptyResponse { .. }));
    }
}
