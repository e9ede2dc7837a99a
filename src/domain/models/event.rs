use std::collections::HashMap;

use crate::domain::value_objects::{BucketName, ObjectName, ObjectUri};

/// Type of a storage notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    /// A new object (or new generation of an object) was written
    Finalize,
    Delete,
    Archive,
    MetadataUpdate,
    /// Any type this build does not know about
    Other(String),
}

impl EventType {
    pub fn parse(value: &str) -> Self {
        match value {
            "OBJECT_FINALIZE" => EventType::Finalize,
            "OBJECT_DELETE" => EventType::Delete,
            "OBJECT_ARCHIVE" => EventType::Archive,
            "OBJECT_METADATA_UPDATE" => EventType::MetadataUpdate,
            other => EventType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::Finalize => "OBJECT_FINALIZE",
            EventType::Delete => "OBJECT_DELETE",
            EventType::Archive => "OBJECT_ARCHIVE",
            EventType::MetadataUpdate => "OBJECT_METADATA_UPDATE",
            EventType::Other(s) => s.as_str(),
        }
    }

    /// Only finalize events trigger a move
    pub fn is_finalize(&self) -> bool {
        matches!(self, EventType::Finalize)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A storage notification received from the event infrastructure.
///
/// Inspected once and discarded; nothing about it is persisted.
#[derive(Debug, Clone)]
pub struct StorageEvent {
    pub bucket_id: BucketName,
    pub object_id: ObjectName,
    pub event_type: EventType,
}

/// Notification attribute keys carrying the event fields
pub const ATTR_BUCKET_ID: &str = "bucketId";
pub const ATTR_OBJECT_ID: &str = "objectId";
pub const ATTR_EVENT_TYPE: &str = "eventType";

/// Errors raised while decoding a notification's attributes
#[derive(Debug, Clone, PartialEq)]
pub enum EventParseError {
    /// One or more required attributes are absent; lists all of them
    MissingAttributes(Vec<String>),

    /// An attribute is present but its value failed validation
    InvalidAttribute { attribute: String, message: String },
}

impl std::fmt::Display for EventParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventParseError::MissingAttributes(attributes) => {
                write!(
                    f,
                    "Missing notification attributes: {}",
                    attributes.join(", ")
                )
            }
            EventParseError::InvalidAttribute { attribute, message } => {
                write!(f, "Invalid notification attribute '{}': {}", attribute, message)
            }
        }
    }
}

impl std::error::Error for EventParseError {}

impl StorageEvent {
    /// Decode an event from a notification's attribute map.
    ///
    /// Checks every required attribute before reporting, so a single error
    /// names everything that is missing.
    pub fn from_attributes(
        attributes: &HashMap<String, String>,
    ) -> Result<Self, EventParseError> {
        let mut missing = Vec::new();
        for key in [ATTR_BUCKET_ID, ATTR_OBJECT_ID, ATTR_EVENT_TYPE] {
            if !attributes.contains_key(key) {
                missing.push(key.to_string());
            }
        }
        if !missing.is_empty() {
            return Err(EventParseError::MissingAttributes(missing));
        }

        let bucket_id = BucketName::new(attributes[ATTR_BUCKET_ID].clone()).map_err(|e| {
            EventParseError::InvalidAttribute {
                attribute: ATTR_BUCKET_ID.to_string(),
                message: e.to_string(),
            }
        })?;

        let object_id = ObjectName::new(attributes[ATTR_OBJECT_ID].clone()).map_err(|e| {
            EventParseError::InvalidAttribute {
                attribute: ATTR_OBJECT_ID.to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            bucket_id,
            object_id,
            event_type: EventType::parse(&attributes[ATTR_EVENT_TYPE]),
        })
    }

    /// URI of the object this event describes
    pub fn source_uri(&self) -> ObjectUri {
        ObjectUri::new(self.bucket_id.clone(), self.object_id.clone())
    }
}

/// Result of handling a single storage event
#[derive(Debug, Clone)]
pub enum RelayOutcome {
    /// The object was copied into the destination bucket
    Moved { destination: ObjectUri, bytes: u64 },

    /// The event type does not trigger a move
    Skipped { event_type: EventType },

    /// The transfer failed and the error was absorbed by the error policy
    Suppressed { error: String },
}
