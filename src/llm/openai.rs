use std::time::Duration;

use anyhow::{Context, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use tokio::time::sleep;

use super::Llm;

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Clone)]
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model: String,
    max_retries: usize,
}

impl LlmClient {
    pub fn new(
        model: String,
        base_url: Option<String>,
        api_key: Option<String>,
        max_retries: usize,
    ) -> Self {
        let mut cfg = OpenAIConfig::default();
        if let Some(url) = base_url {
            cfg = cfg.with_api_base(url);
        }
        if let Some(key) = api_key {
            cfg = cfg.with_api_key(key);
        }
        let client = Client::with_config(cfg);
        Self { client, model, max_retries }
    }

    /// Bounded retry with doubling backoff; the last error propagates.
    async fn send(&self, req: CreateChatCompletionRequest) -> Result<String> {
        let mut delay = INITIAL_BACKOFF;
        let mut attempt = 0;
        loop {
            match self.client.chat().create(req.clone()).await {
                Ok(resp) => {
                    let text = resp
                        .choices
                        .first()
                        .and_then(|c| c.message.content.clone())
                        .unwrap_or_default();
                    return Ok(text);
                }
                Err(err) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(%err, attempt, "chat completion failed, retrying");
                    sleep(delay).await;
                    delay *= 2;
                }
                Err(err) => return Err(err).context("chat completion failed"),
            }
        }
    }
}

#[async_trait::async_trait]
impl Llm for LlmClient {
    async fn chat(&self, messages: Vec<ChatCompletionRequestMessage>) -> Result<String> {
        let req = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(messages)
            .build()?;
        self.send(req).await
    }

    async fn chat_json(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        schema: ResponseFormatJsonSchema,
    ) -> Result<String> {
        let req = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(messages)
            .temperature(0.7)
            .response_format(ResponseFormat::JsonSchema { json_schema: schema })
            .build()?;
        self.send(req).await
    }
}
