use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompanyProfile {
    // Empty when the provider does not know the symbol.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
}

impl CompanyProfile {
    pub fn is_known(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Quote {
    /// Current price. Zero means the provider had no data.
    pub current: BigDecimal,
}

#[derive(Debug, Error)]
pub enum QuoteProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_profile(&self, symbol: &str) -> Result<CompanyProfile, QuoteProviderError>;

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, QuoteProviderError>;
}
