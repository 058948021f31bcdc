pub mod gemini;
pub mod groq;

use async_trait::async_trait;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use super::{ LlmConfig, LlmType };
use self::gemini::GeminiChatClient;
use self::groq::GroqChatClient;
use crate::error::BotError;
use crate::models::chat::ChatMessage;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub response: String,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends the whole ordered history in a single request.
    async fn complete(&self, history: &[ChatMessage]) -> Result<CompletionResponse, BotError>;

    fn get_model(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, BotError> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::Groq => {
            let specific_client = GroqChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::Gemini => {
            let specific_client = GeminiChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}

pub async fn with_timeout<F, T>(timeout: Duration, request: F) -> Result<T, BotError>
    where F: Future<Output = Result<T, BotError>>
{
    match tokio::time::timeout(timeout, request).await {
        Ok(result) => result,
        Err(_) =>
            Err(BotError::Completion(format!("Request timed out after {}s", timeout.as_secs_f32()))),
    }
}

/// A reply with no visible text is a failed completion, never something to send.
pub(crate) fn non_empty_reply(text: Option<String>, provider: &str) -> Result<String, BotError> {
    text.filter(|t| !t.trim().is_empty()).ok_or_else(|| {
        BotError::Completion(format!("Empty response from {} API", provider))
    })
}
