use crate::domain::error::ProviderError;
use serde::de::DeserializeOwned;
use std::time::Duration;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36";

pub const APP_USER_AGENT: &str = concat!("marketsignal/", env!("CARGO_PKG_VERSION"));

pub fn client(user_agent: &str, timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

/// Client for endpoints that reject non-browser agents (Yahoo).
pub fn browser_client(timeout: Duration) -> reqwest::Client {
    client(BROWSER_USER_AGENT, timeout)
}

/// Check the status and decode a JSON body.
pub async fn decode<T: DeserializeOwned>(
    provider: &'static str,
    resp: reqwest::Response,
) -> Result<T, ProviderError> {
    if !resp.status().is_success() {
        return Err(ProviderError::from_response(provider, resp).await);
    }
    resp.json::<T>()
        .await
        .map_err(|e| ProviderError::Parse(format!("{provider}: {e}")))
}
