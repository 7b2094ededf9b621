use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::Result;
use async_openai::types::{ChatCompletionRequestMessage, ResponseFormatJsonSchema};

use crate::llm::Llm;

/// Replays a scripted sequence of replies, one per model call, in order.
/// Plain and schema-constrained calls draw from the same script.
pub struct FakeLlm {
    replies: Mutex<VecDeque<String>>,
}

impl FakeLlm {
    pub fn scripted<I>(replies: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
        }
    }

    fn next_reply(&self) -> String {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("script exhausted")
    }
}

#[async_trait::async_trait]
impl Llm for FakeLlm {
    async fn chat(&self, _messages: Vec<ChatCompletionRequestMessage>) -> Result<String> {
        Ok(self.next_reply())
    }

    async fn chat_json(
        &self,
        _messages: Vec<ChatCompletionRequestMessage>,
        _schema: ResponseFormatJsonSchema,
    ) -> Result<String> {
        Ok(self.next_reply())
    }
}
