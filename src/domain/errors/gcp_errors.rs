/// Errors returned by the GCP REST wrappers (auth, BigQuery, Firestore)
#[derive(Debug, Clone)]
pub enum GcpApiError {
    /// A bearer token could not be obtained
    TokenUnavailable { message: String },

    /// The API answered with a non-success status
    RequestFailed { status: u16, body: String },

    /// The API answered successfully but the body was not in the expected shape
    UnexpectedResponse { message: String },

    /// Infrastructure error with external source
    InfrastructureError {
        message: String,
        source: Option<String>, // Store error as string to allow Clone
    },
}

impl std::fmt::Display for GcpApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GcpApiError::TokenUnavailable { message } => {
                write!(f, "Failed to obtain access token: {}", message)
            }
            GcpApiError::RequestFailed { status, body } => {
                write!(f, "API request failed with status {}: {}", status, body)
            }
            GcpApiError::UnexpectedResponse { message } => {
                write!(f, "Unexpected API response: {}", message)
            }
            GcpApiError::InfrastructureError { message, .. } => {
                write!(f, "Infrastructure error: {}", message)
            }
        }
    }
}

impl std::error::Error for GcpApiError {}

/// Result type for GCP REST operations
pub type GcpApiResult<T> = Result<T, GcpApiError>;
