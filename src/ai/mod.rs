pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::error::ModelError;

/// A stateless, single-turn text generation backend.
///
/// Each call issues exactly one request; no history is carried between calls
/// and implementations must not retry.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        self.query(prompt).await
    }
}
