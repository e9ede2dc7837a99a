use async_trait::async_trait;

use crate::domain::{
    errors::StorageResult,
    models::{RelayOutcome, StorageEvent},
};

/// Port for the object-move handler.
/// This trait defines the business logic for relaying finalized objects
#[async_trait]
pub trait RelayService: Send + Sync + 'static {
    /// Handle one storage notification.
    ///
    /// Non-finalize events are skipped. Transfer failures are routed through
    /// the configured error policy, so `Err` is only returned when the policy
    /// propagates.
    async fn handle_event(&self, event: StorageEvent) -> StorageResult<RelayOutcome>;
}
