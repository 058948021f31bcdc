use async_trait::async_trait;
use log::info;
use std::time::Duration;

use super::{ non_empty_reply, with_timeout, ChatClient, CompletionResponse };
use crate::error::BotError;
use crate::llm::LlmConfig;
use crate::models::chat::{ ChatMessage as HistoryMessage, Role };
use rllm::chat::{ ChatMessage, ChatRole, MessageType };
use rllm::builder::{ LLMBackend, LLMBuilder };

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub struct GeminiChatClient {
    api_key: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

/// Gemini takes the system prompt out of band; only user and model turns go in the transcript.
fn split_history(history: &[HistoryMessage]) -> (Option<String>, Vec<ChatMessage>) {
    let system = history
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let turns = history
        .iter()
        .filter_map(|m| {
            let role = match m.role {
                Role::User => ChatRole::User,
                Role::Assistant => ChatRole::Assistant,
                Role::System => {
                    return None;
                }
            };
            Some(ChatMessage {
                role,
                content: m.content.clone(),
                message_type: MessageType::Text,
            })
        })
        .collect();

    let system = if system.is_empty() { None } else { Some(system) };
    (system, turns)
}

impl GeminiChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        temperature: f32,
        timeout: Duration
    ) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature,
            timeout,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, BotError> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                BotError::Config("Google API key is required for GeminiChatClient".to_string())
            })?;

        // rllm's Google backend always talks to the public endpoint.
        if config.base_url.as_deref().is_some_and(|url| !url.trim().is_empty()) {
            return Err(
                BotError::Config(
                    "CHAT_BASE_URL is not supported for gemini; unset it or use groq".to_string()
                )
            );
        }

        Ok(
            Self::new(
                api_key,
                config.completion_model.clone(),
                config.temperature,
                config.timeout
            )
        )
    }

    async fn request(&self, history: &[HistoryMessage]) -> Result<CompletionResponse, BotError> {
        let (system, messages) = split_history(history);

        let mut builder = LLMBuilder::new()
            .backend(LLMBackend::Google)
            .api_key(self.api_key.clone())
            .model(&self.model)
            .temperature(self.temperature)
            .stream(false);

        if let Some(prompt) = system {
            builder = builder.system(prompt);
        }

        let provider = builder.build().map_err(|e| BotError::Completion(e.to_string()))?;
        let resp = provider.chat(&messages).await.map_err(|e| BotError::Completion(e.to_string()))?;
        let text = non_empty_reply(resp.text().map(|s| s.to_string()), "Gemini")?;
        Ok(CompletionResponse { response: text })
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn complete(&self, history: &[HistoryMessage]) -> Result<CompletionResponse, BotError> {
        info!("GeminiChatClient::complete() → model={} messages={}", self.model, history.len());
        with_timeout(self.timeout, self.request(history)).await
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }
}
