//! Language model access

use async_trait::async_trait;

pub mod openai;

pub use openai::OpenAiClient;

/// A single prompt-completion exchange
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Complete `user` under the `system` instructions and return the text
    async fn complete(&self, system: &str, user: &str) -> crate::Result<String>;
}
