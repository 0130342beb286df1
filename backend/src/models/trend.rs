use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{FavoriteTicker, PricePoint};

/// Trend filter applied to a ticker's recent price history.
///
/// Callers select a mode by its wire id (`1`, `2` or `3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Most recent recorded price, no window.
    Latest,
    /// Last three distinct days never declined.
    NonDecreasing3Day,
    /// At most two day-over-day declines within the last five days.
    MaxTwoDeclines5Day,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown filter id {0}, expected 1, 2 or 3")]
pub struct UnknownFilterMode(pub i32);

impl FilterMode {
    pub fn id(&self) -> i32 {
        match self {
            FilterMode::Latest => 1,
            FilterMode::NonDecreasing3Day => 2,
            FilterMode::MaxTwoDeclines5Day => 3,
        }
    }

    /// Trailing window length in calendar days, `None` when unwindowed.
    pub fn window_days(&self) -> Option<i64> {
        match self {
            FilterMode::Latest => None,
            FilterMode::NonDecreasing3Day => Some(3),
            FilterMode::MaxTwoDeclines5Day => Some(5),
        }
    }

    /// First calendar day (UTC) inside the window ending at `now`.
    pub fn window_start(&self, now: DateTime<Utc>) -> Option<NaiveDate> {
        self.window_days()
            .map(|days| now.date_naive() - Duration::days(days))
    }

    /// Lower bound handed to the store so it can skip old rows.
    pub fn window_start_instant(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.window_start(now)
            .map(|day| day.and_time(NaiveTime::MIN).and_utc())
    }

    /// Whether tickers without any price still appear in the batch output.
    pub fn lists_unpriced(&self) -> bool {
        matches!(self, FilterMode::Latest)
    }
}

impl TryFrom<i32> for FilterMode {
    type Error = UnknownFilterMode;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(FilterMode::Latest),
            2 => Ok(FilterMode::NonDecreasing3Day),
            3 => Ok(FilterMode::MaxTwoDeclines5Day),
            other => Err(UnknownFilterMode(other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterParams {
    pub filter_id: Option<i32>,
}

impl FilterParams {
    pub fn mode(&self) -> Result<FilterMode, UnknownFilterMode> {
        FilterMode::try_from(self.filter_id.unwrap_or(1))
    }
}

// Ticker identity plus the representative price picked by a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterResult {
    pub ticker: String,
    pub name: String,
    pub logo: Option<String>,
    pub latest_price: Option<BigDecimal>,
    pub latest_date: Option<DateTime<Utc>>,
}

impl FilterResult {
    pub fn priced(ticker: &FavoriteTicker, point: &PricePoint) -> Self {
        Self {
            ticker: ticker.ticker.clone(),
            name: ticker.name.clone(),
            logo: ticker.logo.clone(),
            latest_price: Some(point.price.clone()),
            latest_date: Some(point.recorded_at),
        }
    }

    pub fn unpriced(ticker: &FavoriteTicker) -> Self {
        Self {
            ticker: ticker.ticker.clone(),
            name: ticker.name.clone(),
            logo: ticker.logo.clone(),
            latest_price: None,
            latest_date: None,
        }
    }
}
