use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::{PricePoint, PriceRefreshSummary};
use crate::services::price_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_prices))
        .route("/update", post(update_prices))
        .route("/:id", get(get_price).delete(delete_price))
}

pub async fn list_prices(
    State(state): State<AppState>,
) -> Result<Json<Vec<PricePoint>>, AppError> {
    info!("GET /prices - Listing stored prices");
    let prices = price_service::list(&state.pool).await?;
    Ok(Json(prices))
}

pub async fn get_price(
    Path(id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<PricePoint>, AppError> {
    info!("GET /prices/{} - Getting price point", id);
    let price = price_service::get(&state.pool, id).await?;
    Ok(Json(price))
}

pub async fn delete_price(
    Path(id): Path<i32>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /prices/{} - Removing price point", id);
    price_service::remove(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_prices(
    State(state): State<AppState>,
) -> Result<Json<PriceRefreshSummary>, AppError> {
    info!("POST /prices/update - Refreshing current prices");
    let summary = price_service::update_current_prices(
        &state.pool,
        state.quote_provider.as_ref(),
        state.rate_limiter.as_ref(),
        state.clock.as_ref(),
    )
    .await
    .map_err(|e| {
        match &e {
            AppError::RateLimited => warn!("Rate limited while refreshing prices"),
            _ => error!("Failed to refresh prices: {}", e),
        }
        e
    })?;
    Ok(Json(summary))
}
