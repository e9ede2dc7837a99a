use crate::domain::errors::StorageError;

/// Errors that can occur while mirroring a remote URL into a bucket
#[derive(Debug, Clone)]
pub enum FetchError {
    /// The request payload was missing fields or failed validation
    MalformedRequest { message: String },

    /// The remote server answered with a non-success status
    HttpStatus { url: String, status: u16 },

    /// The remote server could not be reached or the body transfer failed
    Transport { url: String, message: String },

    /// Writing the fetched body to the destination bucket failed
    Storage(StorageError),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::MalformedRequest { message } => {
                write!(f, "Malformed fetch request: {}", message)
            }
            FetchError::HttpStatus { url, status } => {
                write!(f, "Error downloading file from url: {} (status {})", url, status)
            }
            FetchError::Transport { url, message } => {
                write!(f, "Error reaching url: {} ({})", url, message)
            }
            FetchError::Storage(e) => {
                write!(f, "Error uploading file to bucket: {}", e)
            }
        }
    }
}

impl std::error::Error for FetchError {}

impl From<StorageError> for FetchError {
    fn from(error: StorageError) -> Self {
        FetchError::Storage(error)
    }
}
