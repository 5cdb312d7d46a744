use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::InvalidInput(s.to_string())
    }
}

/// Failure of an external collaborator (market data, news, filings, AI, chat).
///
/// Every variant is recoverable: callers substitute a default and move on.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No data: {0}")]
    NoData(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl ProviderError {
    /// Builds a `Status` error from a non-success response, keeping a short body excerpt.
    pub async fn from_response(provider: &'static str, resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        let mut body = resp.text().await.unwrap_or_default();
        if body.len() > 200 {
            let cut = (0..=200).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
            body.truncate(cut);
        }
        ProviderError::Status {
            provider,
            status,
            body,
        }
    }
}
