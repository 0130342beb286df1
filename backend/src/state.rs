use std::sync::Arc;
use sqlx::PgPool;
use crate::external::quote_provider::QuoteProvider;
use crate::services::clock::Clock;
use crate::services::rate_limiter::RateLimiter;
use crate::services::rating_service::RatingSource;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub quote_provider: Arc<dyn QuoteProvider>,
    pub rate_limiter: Arc<RateLimiter>,
    pub rating_source: Arc<dyn RatingSource>,
    pub clock: Arc<dyn Clock>,
    pub auth_code: Option<String>,
}
