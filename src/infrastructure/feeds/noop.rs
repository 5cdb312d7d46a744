use crate::domain::entities::article::{Filing, Headline};
use crate::domain::entities::instrument::Instrument;
use crate::domain::error::ProviderError;
use crate::domain::ports::filings_source::FilingsSource;
use crate::domain::ports::news_source::NewsSource;
use async_trait::async_trait;

/// Stands in when news is disabled or `NEWSAPI_KEY` is absent.
pub struct NoopNews;

#[async_trait]
impl NewsSource for NoopNews {
    fn name(&self) -> &str {
        "noop_news"
    }

    async fn headlines(&self, _instrument: &Instrument, _limit: usize) -> Result<Vec<Headline>, ProviderError> {
        Ok(vec![])
    }
}

/// Stands in when filings lookups are disabled.
pub struct NoopFilings;

#[async_trait]
impl FilingsSource for NoopFilings {
    fn name(&self) -> &str {
        "noop_filings"
    }

    async fn recent_filings(&self, _symbol: &str, _limit: usize) -> Result<Vec<Filing>, ProviderError> {
        Ok(vec![])
    }
}
