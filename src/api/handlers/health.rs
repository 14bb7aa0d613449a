use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub vision: String,
    pub version: String,
}

fn connectivity(ok: bool) -> String {
    let status = if ok { "connected" } else { "disconnected" };
    status.to_string()
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (storage_ok, vision_ok) =
        tokio::join!(state.storage.health_check(), state.vision.health_check());

    Json(HealthResponse {
        status: if storage_ok && vision_ok { "ok" } else { "degraded" }.to_string(),
        storage: connectivity(storage_ok),
        vision: connectivity(vision_ok),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
