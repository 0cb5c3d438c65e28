use async_trait::async_trait;

use super::types::{GenerateRequest, GenerateResponse, ProviderError};

#[async_trait]
pub trait AiProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ProviderError>;
}
