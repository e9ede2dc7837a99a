/// Errors that can occur while publishing to a topic
#[derive(Debug, Clone)]
pub enum PublishError {
    /// The named topic does not exist
    TopicNotFound { topic: String },

    /// The backend accepted the request but returned no message id
    EmptyResponse { topic: String },

    /// Infrastructure error with external source
    InfrastructureError {
        message: String,
        source: Option<String>, // Store error as string to allow Clone
    },
}

impl std::fmt::Display for PublishError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishError::TopicNotFound { topic } => {
                write!(f, "Topic not found: {}", topic)
            }
            PublishError::EmptyResponse { topic } => {
                write!(f, "Publish to '{}' returned no message ids", topic)
            }
            PublishError::InfrastructureError { message, .. } => {
                write!(f, "Infrastructure error: {}", message)
            }
        }
    }
}

impl std::error::Error for PublishError {}

/// Result type for publish operations
pub type PublishResult<T> = Result<T, PublishError>;
