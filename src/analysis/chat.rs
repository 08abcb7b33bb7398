//! Chat-completion client abstraction.

use crate::error::{Result, SkinsafeError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Trait for chat-completion providers.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one system and one user message; return the reply text.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// OpenAI chat completions.
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIChatModel {
    pub fn new(model: &str, temperature: f32) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
            temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(|e| SkinsafeError::Analysis(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| SkinsafeError::Analysis(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| SkinsafeError::Analysis(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            SkinsafeError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        let reply = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| SkinsafeError::Analysis("Empty response from LLM".to_string()))?
            .clone();

        debug!("Received {} characters from model", reply.len());
        Ok(reply)
    }
}
