use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::{FavoriteTicker, FilterParams, FilterResult, ProcessParams, TickerProfile, TickerRating};
use crate::services::{favorites_service, rating_service};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_favorites).post(add_favorite))
        .route("/filtered_prices", get(get_filtered_prices))
        .route("/rating", post(get_ratings))
        .route("/process", post(process_tickers))
        .route("/:id", get(get_favorite).delete(delete_favorite))
}

pub async fn list_favorites(
    State(state): State<AppState>,
) -> Result<Json<Vec<FavoriteTicker>>, AppError> {
    info!("GET /favorites - Listing watch-list");
    let tickers = favorites_service::list(&state.pool).await?;
    Ok(Json(tickers))
}

pub async fn get_favorite(
    Path(id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<FavoriteTicker>, AppError> {
    info!("GET /favorites/{} - Getting ticker", id);
    let ticker = favorites_service::get(&state.pool, id).await?;
    Ok(Json(ticker))
}

pub async fn add_favorite(
    State(state): State<AppState>,
    Json(symbol): Json<String>,
) -> Result<(StatusCode, Json<FavoriteTicker>), AppError> {
    info!("POST /favorites - Adding {}", symbol);
    let ticker = favorites_service::add(
        &state.pool,
        state.quote_provider.as_ref(),
        state.rate_limiter.as_ref(),
        state.clock.as_ref(),
        &symbol,
    )
    .await
    .map_err(|e| {
        match &e {
            AppError::Db(_) | AppError::External(_) | AppError::Internal(_) => error!("Failed to add {}: {}", symbol, e),
            _ => warn!("Rejected {}: {}", symbol, e),
        }
        e
    })?;
    Ok((StatusCode::CREATED, Json(ticker)))
}

pub async fn delete_favorite(
    Path(id): Path<i32>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /favorites/{} - Removing ticker", id);
    favorites_service::remove(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_filtered_prices(
    Query(params): Query<FilterParams>,
    State(state): State<AppState>,
) -> Result<Json<Vec<FilterResult>>, AppError> {
    let mode = params.mode()?;
    info!("GET /favorites/filtered_prices - filter {} ({:?})", mode.id(), mode);

    let results = favorites_service::filtered_prices(&state.pool, mode, state.clock.now())
        .await
        .map_err(|e| {
            error!("Failed to filter prices with {:?}: {}", mode, e);
            e
        })?;
    Ok(Json(results))
}

pub async fn get_ratings(
    State(state): State<AppState>,
    Json(symbols): Json<Vec<String>>,
) -> Result<Json<Vec<TickerRating>>, AppError> {
    info!("POST /favorites/rating - Rating {} tickers", symbols.len());
    let ratings =
        rating_service::rate_tickers(&state.pool, state.rating_source.as_ref(), &symbols).await?;
    Ok(Json(ratings))
}

pub async fn process_tickers(
    Query(params): Query<ProcessParams>,
    Json(ratings): Json<Vec<TickerRating>>,
) -> Result<Json<Vec<TickerProfile>>, AppError> {
    info!(
        "POST /favorites/process - {} ratings above {}",
        ratings.len(),
        params.ticker_limit
    );
    let profiles = rating_service::select_above_limit(&ratings, params.ticker_limit)?;
    Ok(Json(profiles))
}
