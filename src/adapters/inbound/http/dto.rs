use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::models::{EventParseError, FetchOutcome, RelayOutcome};

/// Envelope posted by a push subscription
#[derive(Debug, Clone, Deserialize)]
pub struct PushEnvelopeDto {
    pub message: PushMessageDto,
    #[serde(default)]
    pub subscription: Option<String>,
}

/// The message inside a push envelope
#[derive(Debug, Clone, Deserialize)]
pub struct PushMessageDto {
    /// Notification attributes; storage events arrive entirely in here
    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// Base64-encoded payload
    #[serde(default)]
    pub data: Option<String>,

    #[serde(default, rename = "messageId", alias = "message_id")]
    pub message_id: Option<String>,
}

/// DTO for the outcome of a storage event
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RelayOutcomeDto {
    Moved { destination: String, bytes: u64 },
    Skipped { event_type: String },
    Suppressed { error: String },
}

impl From<RelayOutcome> for RelayOutcomeDto {
    fn from(outcome: RelayOutcome) -> Self {
        match outcome {
            RelayOutcome::Moved { destination, bytes } => RelayOutcomeDto::Moved {
                destination: destination.to_string(),
                bytes,
            },
            RelayOutcome::Skipped { event_type } => RelayOutcomeDto::Skipped {
                event_type: event_type.to_string(),
            },
            RelayOutcome::Suppressed { error } => RelayOutcomeDto::Suppressed { error },
        }
    }
}

/// DTO for the outcome of a fetch request
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcomeDto {
    Fetched { uri: String, bytes: u64 },
    Failed { error: String },
}

impl From<FetchOutcome> for FetchOutcomeDto {
    fn from(outcome: FetchOutcome) -> Self {
        match outcome {
            FetchOutcome::Fetched { uri, bytes } => FetchOutcomeDto::Fetched {
                uri: uri.to_string(),
                bytes,
            },
            FetchOutcome::Failed { error } => FetchOutcomeDto::Failed { error },
        }
    }
}

/// DTO for error responses
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponseDto {
    pub error: String,
    pub message: String,
    pub details: Option<HashMap<String, serde_json::Value>>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponseDto {
    pub fn bad_request(message: &str) -> Self {
        ErrorResponseDto {
            error: "BadRequest".to_string(),
            message: message.to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn internal(message: &str) -> Self {
        ErrorResponseDto {
            error: "InternalError".to_string(),
            message: message.to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn unavailable(message: &str) -> Self {
        ErrorResponseDto {
            error: "Unavailable".to_string(),
            message: message.to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn from_event_parse_error(error: EventParseError) -> Self {
        let mut details = HashMap::new();

        if let EventParseError::MissingAttributes(attributes) = &error {
            details.insert(
                "missing_attributes".to_string(),
                serde_json::Value::Array(
                    attributes
                        .iter()
                        .map(|a| serde_json::Value::String(a.clone()))
                        .collect(),
                ),
            );
        }

        ErrorResponseDto {
            error: "InvalidNotification".to_string(),
            message: error.to_string(),
            details: if details.is_empty() {
                None
            } else {
                Some(details)
            },
            timestamp: Utc::now(),
        }
    }
}

/// DTO for health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponseDto {
    pub status: String,
    pub version: String,
}
