use crate::external::quote_provider::{CompanyProfile, Quote, QuoteProvider, QuoteProviderError};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";

pub struct FinnhubProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FinnhubProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        symbol: &str,
    ) -> Result<T, QuoteProviderError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let resp = self
            .client
            .get(url)
            .query(&[("symbol", symbol), ("token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| QuoteProviderError::Network(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(QuoteProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(QuoteProviderError::BadResponse(format!(
                "{} returned HTTP {}",
                endpoint, status
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| QuoteProviderError::Parse(e.to_string()))
    }
}

// Only the fields we use from /quote.
#[derive(Debug, Deserialize)]
struct FinnhubQuote {
    #[serde(rename = "c")]
    current: f64,
}

fn quote_from_body(body: FinnhubQuote) -> Result<Quote, QuoteProviderError> {
    if !body.current.is_finite() {
        return Err(QuoteProviderError::Parse(format!(
            "non-finite price {}",
            body.current
        )));
    }

    let current = body
        .current
        .to_string()
        .parse::<BigDecimal>()
        .map_err(|e| QuoteProviderError::Parse(e.to_string()))?;

    Ok(Quote { current })
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    async fn fetch_profile(&self, symbol: &str) -> Result<CompanyProfile, QuoteProviderError> {
        self.get_json::<CompanyProfile>("stock/profile2", symbol).await
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, QuoteProviderError> {
        let body = self.get_json::<FinnhubQuote>("quote", symbol).await?;
        quote_from_body(body)
    }
}
