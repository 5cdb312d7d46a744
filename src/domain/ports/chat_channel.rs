use crate::domain::error::ProviderError;
use async_trait::async_trait;

/// Outbound chat destination (a Telegram chat, a Discord channel, stdout).
#[async_trait]
pub trait ChatChannel: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, text: &str) -> Result<(), ProviderError>;
}
