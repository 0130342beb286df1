use axum::{routing::get, Json, Router};
use serde::Serialize;
use tracing::debug;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}

async fn health() -> Json<HealthStatus> {
    debug!("GET /health");
    Json(HealthStatus {
        status: "OK",
        version: env!("CARGO_PKG_VERSION"),
    })
}
