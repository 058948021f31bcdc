use thiserror::Error;

/// Marker prepended to the reply when the completion provider fails.
pub const AI_ERROR_MARKER: &str = "[AI ERROR]";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BotError {
    #[error("Please wait before sending another message.")]
    RateLimited,

    #[error("{0}")]
    Completion(String),

    #[error("Failed to deliver reply: {0}")]
    Delivery(String),

    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BotError {
    /// Text shown to the user in place of a completion.
    pub fn user_reply(&self) -> String {
        match self {
            BotError::Completion(message) => format!("{} {}", AI_ERROR_MARKER, message),
            other => format!("{} {}", AI_ERROR_MARKER, other),
        }
    }
}
