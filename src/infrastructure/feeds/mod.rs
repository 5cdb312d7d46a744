pub mod forex;
pub mod newsapi;
pub mod noop;
pub mod sec_edgar;
pub mod yahoo;

use crate::domain::entities::instrument::Instrument;
use crate::domain::entities::options::OptionChainSnapshot;
use crate::domain::error::ProviderError;
use crate::domain::ports::market_data::{MarketDataProvider, Quote};
use async_trait::async_trait;
use forex::ExchangeRateApi;
use std::time::Duration;
use yahoo::YahooFinance;

/// Routes each instrument kind to the feed that prices it: equities and
/// option chains to Yahoo Finance, currency and metal pairs to the rate API.
pub struct MarketRouter {
    yahoo: YahooFinance,
    rates: ExchangeRateApi,
}

impl MarketRouter {
    pub fn new(timeout: Duration) -> Self {
        Self::with_feeds(YahooFinance::new(timeout), ExchangeRateApi::new(timeout))
    }

    pub fn with_feeds(yahoo: YahooFinance, rates: ExchangeRateApi) -> Self {
        Self { yahoo, rates }
    }
}

#[async_trait]
impl MarketDataProvider for MarketRouter {
    fn name(&self) -> &str {
        "market_router"
    }

    async fn quote(&self, instrument: &Instrument) -> Result<Quote, ProviderError> {
        match instrument.pair() {
            Some((base, quote)) => {
                let value = self.rates.rate(base, quote).await?;
                Ok(Quote {
                    value,
                    volume: None,
                })
            }
            None => self.yahoo.quote(instrument.symbol()).await,
        }
    }

    async fn option_chains(
        &self,
        symbol: &str,
        max_expirations: usize,
    ) -> Result<Vec<OptionChainSnapshot>, ProviderError> {
        self.yahoo.option_chains(symbol, max_expirations).await
    }
}
