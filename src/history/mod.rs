mod memory;

pub use memory::InMemoryConversationStore;

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use crate::error::BotError;
use crate::models::chat::{ ChatId, ChatMessage, Conversation, Role };

pub const DEFAULT_HISTORY_LIMIT: usize = 16;

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Appends a message and trims the conversation to its retention limit.
    async fn append(&self, conversation_id: ChatId, role: Role, content: &str);

    /// Returns the retained history, seeding it with the system prompt for a new conversation.
    async fn get(&self, conversation_id: ChatId) -> Conversation;
}

/// How a conversation is cut back once it exceeds the retention limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimPolicy {
    /// Keep the last N entries whatever their role. The system prompt falls
    /// out once the conversation grows past the limit.
    #[default]
    LastEntries,
    /// Keep the leading system prompt plus the last N-1 entries.
    KeepSystemPrompt,
}

impl FromStr for TrimPolicy {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "last" => Ok(TrimPolicy::LastEntries),
            "keep-system" => Ok(TrimPolicy::KeepSystemPrompt),
            _ => Err(BotError::Config(format!("Unsupported history trim policy: {}", s))),
        }
    }
}

impl fmt::Display for TrimPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrimPolicy::LastEntries => write!(f, "last"),
            TrimPolicy::KeepSystemPrompt => write!(f, "keep-system"),
        }
    }
}

pub fn trim_history(messages: &mut Vec<ChatMessage>, limit: usize, policy: TrimPolicy) {
    if messages.len() <= limit {
        return;
    }
    let pinned = policy == TrimPolicy::KeepSystemPrompt
        && limit > 0
        && messages.first().map(|m| m.role) == Some(Role::System);

    if pinned {
        let excess = messages.len() - limit;
        messages.drain(1..1 + excess);
    } else {
        let excess = messages.len() - limit;
        messages.drain(..excess);
    }
}
