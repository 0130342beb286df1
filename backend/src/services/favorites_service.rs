use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::db;
use crate::errors::AppError;
use crate::external::quote_provider::QuoteProvider;
use crate::models::{normalize_symbol, FavoriteTicker, FilterMode, FilterResult, PricePoint};
use crate::services::clock::Clock;
use crate::services::price_service;
use crate::services::rate_limiter::RateLimiter;
use crate::services::trend_filter::{self, TrendFilterError};

pub async fn list(pool: &PgPool) -> Result<Vec<FavoriteTicker>, AppError> {
    db::ticker_queries::fetch_all(pool).await.map_err(|e| {
        error!("Failed to fetch watch-list: {}", e);
        AppError::Db(e)
    })
}

pub async fn get(pool: &PgPool, id: i32) -> Result<FavoriteTicker, AppError> {
    db::ticker_queries::fetch_one(pool, id)
        .await
        .map_err(|e| {
            error!("Failed to fetch ticker {}: {}", id, e);
            AppError::Db(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Ticker {} not found", id)))
}

/// Adds a symbol to the watch-list after confirming it with the provider.
///
/// The first quote is stored right away when the provider has one.
pub async fn add(
    pool: &PgPool,
    provider: &dyn QuoteProvider,
    limiter: &RateLimiter,
    clock: &dyn Clock,
    raw_symbol: &str,
) -> Result<FavoriteTicker, AppError> {
    let symbol = normalize_symbol(raw_symbol)
        .ok_or_else(|| AppError::Validation("Ticker is empty.".to_string()))?;

    if db::ticker_queries::exists_by_symbol(pool, &symbol).await? {
        return Err(AppError::Conflict(format!("Ticker {} is already in favorites.", symbol)));
    }

    let profile = {
        let _guard = limiter
            .acquire()
            .await
            .map_err(|e| AppError::External(format!("Quote limiter closed: {}", e)))?;
        provider.fetch_profile(&symbol).await.map_err(|e| {
            error!("Profile lookup failed for {}: {}", symbol, e);
            AppError::from(e)
        })?
    };

    if !profile.is_known() {
        return Err(AppError::Validation(format!("Ticker {} not found.", symbol)));
    }

    let ticker = db::ticker_queries::insert(pool, &symbol, profile.name.trim(), profile.logo.as_deref())
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(format!("Ticker {} is already in favorites.", symbol))
            }
            other => AppError::Db(other),
        })?;

    info!("⭐ Added {} ({}) to favorites", ticker.ticker, ticker.name);

    // The ticker is already stored; a missing first quote only delays its history.
    match price_service::record_quote(pool, provider, limiter, &ticker, clock.now()).await {
        Ok(Some(point)) => info!("✓ Stored initial price {} for {}", point.price, ticker.ticker),
        Ok(None) => warn!("No initial quote for {}", ticker.ticker),
        Err(e) => warn!("Failed to store initial quote for {}: {}", ticker.ticker, e),
    }

    Ok(ticker)
}

pub async fn remove(pool: &PgPool, id: i32) -> Result<(), AppError> {
    let deleted = db::ticker_queries::delete_with_prices(pool, id).await.map_err(|e| {
        error!("Failed to delete ticker {}: {}", id, e);
        AppError::Db(e)
    })?;

    if !deleted {
        return Err(AppError::NotFound(format!("Ticker {} not found", id)));
    }

    info!("🗑️ Removed ticker {} and its prices", id);
    Ok(())
}

/// How much of a ticker's history a filter mode reads from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryScope {
    /// Only the newest point.
    LatestOnly,
    /// Every point recorded at or after the instant.
    Since(DateTime<Utc>),
}

pub fn history_scope(mode: FilterMode, now: DateTime<Utc>) -> HistoryScope {
    match mode.window_start_instant(now) {
        Some(start) => HistoryScope::Since(start),
        None => HistoryScope::LatestOnly,
    }
}

/// Runs `mode` over every watch-list ticker.
pub async fn filtered_prices(
    pool: &PgPool,
    mode: FilterMode,
    now: DateTime<Utc>,
) -> Result<Vec<FilterResult>, AppError> {
    let tickers = list(pool).await?;
    let scope = history_scope(mode, now);

    let mut histories = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let points = match scope {
            HistoryScope::LatestOnly => db::price_queries::fetch_latest_for_ticker(pool, ticker.id)
                .await
                .map(|latest| latest.into_iter().collect()),
            HistoryScope::Since(start) => {
                db::price_queries::fetch_for_ticker_since(pool, ticker.id, Some(start)).await
            }
        }
        .map_err(|e| {
            error!("Failed to fetch prices for {}: {}", ticker.ticker, e);
            AppError::Db(e)
        })?;
        histories.push((ticker, points));
    }

    let results = assemble_results(&histories, mode, now)?;
    info!(
        "Filter {:?} kept {} of {} tickers",
        mode,
        results.len(),
        histories.len()
    );
    Ok(results)
}

/// Evaluates each ticker independently, preserving watch-list order.
///
/// Under `Latest`, tickers with no prices are kept without a price.
pub fn assemble_results(
    histories: &[(FavoriteTicker, Vec<PricePoint>)],
    mode: FilterMode,
    now: DateTime<Utc>,
) -> Result<Vec<FilterResult>, TrendFilterError> {
    let mut results = Vec::new();

    for (ticker, points) in histories {
        match trend_filter::evaluate(ticker, points, mode, now)? {
            Some(result) => results.push(result),
            None if mode.lists_unpriced() => results.push(FilterResult::unpriced(ticker)),
            None => {}
        }
    }

    Ok(results)
}
