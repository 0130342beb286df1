use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// One observed price for a watch-list ticker. Several points may share a calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PricePoint {
    pub id: i32,
    pub favorite_ticker_id: i32,
    pub price: BigDecimal,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRefreshSummary {
    pub inserted: usize,
    pub skipped: usize,
}
