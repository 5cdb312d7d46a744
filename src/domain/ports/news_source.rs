use crate::domain::entities::article::Headline;
use crate::domain::entities::instrument::Instrument;
use crate::domain::error::ProviderError;
use async_trait::async_trait;

#[async_trait]
pub trait NewsSource: Send + Sync {
    fn name(&self) -> &str;

    /// Up to `limit` headlines mentioning the instrument, most recent first.
    async fn headlines(
        &self,
        instrument: &Instrument,
        limit: usize,
    ) -> Result<Vec<Headline>, ProviderError>;
}
