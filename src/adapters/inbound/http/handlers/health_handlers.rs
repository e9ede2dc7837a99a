use axum::{http::StatusCode, Json};

use crate::adapters::inbound::http::dto::HealthResponseDto;

/// Handle health checks
pub async fn health() -> (StatusCode, Json<HealthResponseDto>) {
    (
        StatusCode::OK,
        Json(HealthResponseDto {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
