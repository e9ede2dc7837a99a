use axum::{extract::State, http::StatusCode, Json};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::{
    adapters::inbound::http::{
        dto::{ErrorResponseDto, FetchOutcomeDto, PushEnvelopeDto, RelayOutcomeDto},
        router::AppState,
    },
    domain::models::StorageEvent,
};

/// Handle a storage notification delivered by a push subscription.
///
/// Returns 400 when the notification cannot be decoded (bad pushes would
/// otherwise be redelivered forever) and 500 only when the error policy
/// propagates a transfer failure.
pub async fn handle_storage_event(
    State(app_state): State<AppState>,
    Json(envelope): Json<PushEnvelopeDto>,
) -> Result<(StatusCode, Json<RelayOutcomeDto>), (StatusCode, Json<ErrorResponseDto>)> {
    let invocation = Uuid::new_v4();
    let message_id = envelope.message.message_id.clone().unwrap_or_default();
    let span = info_span!("storage_event", %invocation, %message_id);

    async move {
        let event = StorageEvent::from_attributes(&envelope.message.attributes).map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponseDto::from_event_parse_error(e)),
            )
        })?;

        let outcome = app_state.relay_service.handle_event(event).await.map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponseDto::internal(&e.to_string())),
            )
        })?;

        Ok((StatusCode::OK, Json(RelayOutcomeDto::from(outcome))))
    }
    .instrument(span)
    .await
}

/// Handle a fetch request delivered by a push subscription.
///
/// The outcome is always 200 once the envelope decodes; fetch failures are
/// reported in the body and on the error topic, not via the status code.
pub async fn handle_fetch_event(
    State(app_state): State<AppState>,
    Json(envelope): Json<PushEnvelopeDto>,
) -> Result<(StatusCode, Json<FetchOutcomeDto>), (StatusCode, Json<ErrorResponseDto>)> {
    let Some(fetch_service) = app_state.fetch_service.clone() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponseDto::unavailable(
                "Fetching is not configured; set OUTPUT_TOPIC_NAME and ERROR_TOPIC_NAME",
            )),
        ));
    };

    let data = envelope.message.data.as_deref().ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponseDto::bad_request("Push message carries no data")),
        )
    })?;

    let payload = BASE64.decode(data).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponseDto::bad_request(&format!(
                "Invalid base64 payload: {}",
                e
            ))),
        )
    })?;

    let invocation = Uuid::new_v4();
    let span = info_span!("fetch_event", %invocation);
    let outcome = fetch_service.handle_message(&payload).instrument(span).await;

    Ok((StatusCode::OK, Json(FetchOutcomeDto::from(outcome))))
}
