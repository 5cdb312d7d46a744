use crate::domain::entities::instrument::Instrument;
use crate::domain::entities::options::OptionChainSnapshot;
use crate::domain::error::ProviderError;
use async_trait::async_trait;
use serde::Serialize;

/// Latest observation for an instrument: a price for equities, a rate for pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quote {
    pub value: f64,
    /// Traded volume; only equities report one.
    pub volume: Option<u64>,
}

/// Market-data port: quotes for any instrument kind plus equity option chains.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    async fn quote(&self, instrument: &Instrument) -> Result<Quote, ProviderError>;

    /// Option chains for the nearest `max_expirations` expirations, nearest first.
    async fn option_chains(
        &self,
        symbol: &str,
        max_expirations: usize,
    ) -> Result<Vec<OptionChainSnapshot>, ProviderError>;
}
