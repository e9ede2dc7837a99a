use async_trait::async_trait;

use crate::domain::models::{FetchOutcome, FetchRequest};

/// Port for the fetch-and-store pipeline.
/// This trait defines the business logic for pulling remote files into storage
#[async_trait]
pub trait FetchService: Send + Sync + 'static {
    /// Handle a raw message payload as received from a subscription push.
    ///
    /// Decode failures are reported as a failed outcome rather than an error,
    /// so a bad message never causes redelivery.
    async fn handle_message(&self, payload: &[u8]) -> FetchOutcome;

    /// Handle an already-decoded fetch request.
    async fn handle_request(&self, request: FetchRequest) -> FetchOutcome;
}
