use bigdecimal::Zero;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::time::{sleep as async_sleep, Duration};
use tracing::{error, info, warn};

use crate::db;
use crate::errors::AppError;
use crate::external::quote_provider::QuoteProvider;
use crate::models::{FavoriteTicker, PricePoint, PriceRefreshSummary};
use crate::services::clock::Clock;
use crate::services::rate_limiter::RateLimiter;

const WATCH_LIST_MAX_ATTEMPTS: u32 = 10;
const WATCH_LIST_RETRY_DELAY: Duration = Duration::from_secs(2);

pub async fn list(pool: &PgPool) -> Result<Vec<PricePoint>, AppError> {
    db::price_queries::fetch_all(pool).await.map_err(|e| {
        error!("Failed to fetch price points: {}", e);
        AppError::Db(e)
    })
}

pub async fn get(pool: &PgPool, id: i32) -> Result<PricePoint, AppError> {
    db::price_queries::fetch_one(pool, id)
        .await
        .map_err(|e| {
            error!("Failed to fetch price point {}: {}", id, e);
            AppError::Db(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Price point {} not found", id)))
}

pub async fn remove(pool: &PgPool, id: i32) -> Result<(), AppError> {
    let deleted = db::price_queries::delete(pool, id).await.map_err(|e| {
        error!("Failed to delete price point {}: {}", id, e);
        AppError::Db(e)
    })?;

    if !deleted {
        return Err(AppError::NotFound(format!("Price point {} not found", id)));
    }
    Ok(())
}

/// Fetches the current quote for `ticker` and stores it.
///
/// Returns `Ok(None)` when the provider reports a zero price, which means it
/// has no data for the symbol.
pub async fn record_quote(
    pool: &PgPool,
    provider: &dyn QuoteProvider,
    limiter: &RateLimiter,
    ticker: &FavoriteTicker,
    recorded_at: DateTime<Utc>,
) -> Result<Option<PricePoint>, AppError> {
    let quote = {
        let _guard = limiter
            .acquire()
            .await
            .map_err(|e| AppError::External(format!("Quote limiter closed: {}", e)))?;
        provider.fetch_quote(&ticker.ticker).await?
    };

    if quote.current.is_zero() {
        return Ok(None);
    }

    let point = db::price_queries::insert(pool, ticker.id, &quote.current, recorded_at).await?;
    Ok(Some(point))
}

/// Appends a fresh quote for every watch-list ticker.
///
/// Tickers whose quote fails or comes back as zero are skipped.
pub async fn update_current_prices(
    pool: &PgPool,
    provider: &dyn QuoteProvider,
    limiter: &RateLimiter,
    clock: &dyn Clock,
) -> Result<PriceRefreshSummary, AppError> {
    let tickers = load_watch_list_with_retry(pool).await?;
    let mut summary = PriceRefreshSummary::default();

    for ticker in &tickers {
        match record_quote(pool, provider, limiter, ticker, clock.now()).await {
            Ok(Some(point)) => {
                info!("✓ Stored price {} for {}", point.price, ticker.ticker);
                summary.inserted += 1;
            }
            Ok(None) => {
                warn!("No quote data for {}, skipping", ticker.ticker);
                summary.skipped += 1;
            }
            Err(e) => {
                warn!("Failed to refresh price for {}: {}", ticker.ticker, e);
                summary.skipped += 1;
            }
        }
    }

    info!(
        "Price refresh finished: {} inserted, {} skipped",
        summary.inserted, summary.skipped
    );
    Ok(summary)
}

// The database may still be starting when the first refresh fires.
async fn load_watch_list_with_retry(pool: &PgPool) -> Result<Vec<FavoriteTicker>, AppError> {
    for attempt in 1..=WATCH_LIST_MAX_ATTEMPTS {
        match db::ticker_queries::fetch_all(pool).await {
            Ok(tickers) if !tickers.is_empty() => return Ok(tickers),
            Ok(_) => warn!(
                "Watch-list is empty (attempt {}/{})",
                attempt, WATCH_LIST_MAX_ATTEMPTS
            ),
            Err(e) => warn!(
                "Failed to load watch-list (attempt {}/{}): {}",
                attempt, WATCH_LIST_MAX_ATTEMPTS, e
            ),
        }

        if attempt < WATCH_LIST_MAX_ATTEMPTS {
            async_sleep(WATCH_LIST_RETRY_DELAY).await;
        }
    }

    Err(AppError::External(format!(
        "Database not ready or watch-list empty after {} attempts",
        WATCH_LIST_MAX_ATTEMPTS
    )))
}
