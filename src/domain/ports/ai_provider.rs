use crate::domain::error::ProviderError;
use async_trait::async_trait;

/// Free-form text completion: prompt in, narrative out. No schema is enforced on the reply.
#[async_trait]
pub trait AiProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}
