use crate::domain::error::ProviderError;
use crate::domain::ports::chat_channel::ChatChannel;
use async_trait::async_trait;

/// Prints messages to stdout instead of sending them. Used by `once --dry-run`.
pub struct ConsoleChannel;

#[async_trait]
impl ChatChannel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, text: &str) -> Result<(), ProviderError> {
        println!("{text}\n");
        Ok(())
    }
}
