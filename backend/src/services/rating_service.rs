use rand::Rng;
use sqlx::PgPool;
use tracing::info;

use crate::db::ticker_queries;
use crate::errors::AppError;
use crate::models::{normalize_symbol, FavoriteTicker, TickerProfile, TickerRating};

pub const RATING_MIN: i32 = -10;
pub const RATING_MAX: i32 = 10;

/// Scores a watch-list ticker in `[RATING_MIN, RATING_MAX]`.
pub trait RatingSource: Send + Sync {
    fn rate(&self, ticker: &FavoriteTicker) -> i32;
}

/// Stand-in until a real scoring service exists: every rating is random.
pub struct PlaceholderRatingSource;

impl RatingSource for PlaceholderRatingSource {
    fn rate(&self, _ticker: &FavoriteTicker) -> i32 {
        rand::rng().random_range(RATING_MIN..=RATING_MAX)
    }
}

/// Rates every requested symbol that is on the watch-list; others are skipped.
pub async fn rate_tickers(
    pool: &PgPool,
    source: &dyn RatingSource,
    symbols: &[String],
) -> Result<Vec<TickerRating>, AppError> {
    let normalized: Vec<String> = symbols.iter().filter_map(|s| normalize_symbol(s)).collect();
    let tickers = ticker_queries::fetch_by_symbols(pool, &normalized).await?;

    info!("Rating {} of {} requested tickers", tickers.len(), symbols.len());

    Ok(tickers
        .iter()
        .map(|t| TickerRating::for_ticker(t, source.rate(t)))
        .collect())
}

/// Profiles of the rated tickers scoring strictly above `limit`, in input order.
pub fn select_above_limit(
    ratings: &[TickerRating],
    limit: i32,
) -> Result<Vec<TickerProfile>, AppError> {
    if ratings.is_empty() {
        return Err(AppError::Validation("Ticker list is empty".to_string()));
    }

    Ok(ratings
        .iter()
        .filter(|r| r.rating > limit)
        .map(TickerProfile::from)
        .collect())
}
