use crate::domain::error::ProviderError;
use crate::infrastructure::http::{client, decode, APP_USER_AGENT};
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://open.er-api.com";

/// Exchange rates from open.er-api.com (free tier, no key). Also serves
/// metal codes such as XAU, which is how commodity pairs are priced.
pub struct ExchangeRateApi {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, serde::Deserialize)]
struct LatestRates {
    result: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
    #[serde(default, rename = "error-type")]
    error_type: Option<String>,
}

impl ExchangeRateApi {
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: client(APP_USER_AGENT, timeout),
        }
    }

    /// Units of `quote` per one unit of `base`.
    pub async fn rate(&self, base: &str, quote: &str) -> Result<f64, ProviderError> {
        let url = format!("{}/v6/latest/{base}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let data: LatestRates = decode("exchange_rate_api", resp).await?;
        if data.result != "success" {
            return Err(ProviderError::NoData(format!(
                "rates for {base}: {}",
                data.error_type.unwrap_or(data.result)
            )));
        }

        data.rates
            .get(quote)
            .copied()
            .ok_or_else(|| ProviderError::NoData(format!("no {quote} rate for {base}")))
    }
}
