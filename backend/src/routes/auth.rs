use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(validate_code))
}

// Single shared access code; there are no user accounts.
pub async fn validate_code(
    State(state): State<AppState>,
    Json(code): Json<String>,
) -> Result<Json<&'static str>, AppError> {
    info!("POST /auth - Validating access code");
    if code_matches(state.auth_code.as_deref(), &code) {
        Ok(Json("OK"))
    } else {
        warn!("Rejected access code");
        Err(AppError::Unauthorized)
    }
}

fn code_matches(expected: Option<&str>, given: &str) -> bool {
    matches!(expected, Some(code) if code == given)
}
