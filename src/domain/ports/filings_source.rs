use crate::domain::entities::article::Filing;
use crate::domain::error::ProviderError;
use async_trait::async_trait;

/// Public regulatory filings feed, keyed by equity ticker.
#[async_trait]
pub trait FilingsSource: Send + Sync {
    fn name(&self) -> &str;

    async fn recent_filings(&self, symbol: &str, limit: usize)
        -> Result<Vec<Filing>, ProviderError>;
}
