use serde::{Deserialize, Serialize};

use crate::models::FavoriteTicker;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerRating {
    pub ticker: String,
    pub name: String,
    pub logo: Option<String>,
    pub rating: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerProfile {
    pub ticker: String,
    pub name: String,
    pub logo: Option<String>,
}

impl From<&TickerRating> for TickerProfile {
    fn from(r: &TickerRating) -> Self {
        Self {
            ticker: r.ticker.clone(),
            name: r.name.clone(),
            logo: r.logo.clone(),
        }
    }
}

impl TickerRating {
    pub fn for_ticker(ticker: &FavoriteTicker, rating: i32) -> Self {
        Self {
            ticker: ticker.ticker.clone(),
            name: ticker.name.clone(),
            logo: ticker.logo.clone(),
            rating,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessParams {
    #[serde(default)]
    pub ticker_limit: i32,
}
