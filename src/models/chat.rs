use serde::{ Serialize, Deserialize };
use std::fmt;

pub type ChatId = i64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversation {
    pub id: ChatId,
    pub messages: Vec<ChatMessage>,
}

/// A text message received from the messaging platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub message_id: Option<i64>,
    pub sender: String,
    pub text: Option<String>,
    pub is_command: bool,
    pub business_connection_id: Option<String>,
}

impl InboundMessage {
    pub fn text(chat_id: ChatId, sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            message_id: None,
            sender: sender.into(),
            text: Some(text.into()),
            is_command: false,
            business_connection_id: None,
        }
    }
}

/// A reply to be sent back to the originating conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub reply_to: Option<i64>,
    pub business_connection_id: Option<String>,
}
