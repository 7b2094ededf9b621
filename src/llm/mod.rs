use anyhow::Result;
use async_openai::types::{ChatCompletionRequestMessage, ResponseFormatJsonSchema};

pub mod openai;

pub use openai::LlmClient;

#[async_trait::async_trait]
pub trait Llm: Send + Sync {
    /// One chat turn; returns the assistant's text content.
    async fn chat(&self, messages: Vec<ChatCompletionRequestMessage>) -> Result<String>;

    /// One chat turn constrained to a strict JSON schema response.
    async fn chat_json(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        schema: ResponseFormatJsonSchema,
    ) -> Result<String>;
}
