use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use log::debug;

use super::{ trim_history, ConversationStore, TrimPolicy };
use crate::models::chat::{ ChatId, ChatMessage, Conversation, Role };

pub struct InMemoryConversationStore {
    conversations: Mutex<HashMap<ChatId, Vec<ChatMessage>>>,
    system_prompt: String,
    limit: usize,
    policy: TrimPolicy,
}

impl InMemoryConversationStore {
    pub fn new(system_prompt: impl Into<String>, limit: usize, policy: TrimPolicy) -> Self {
        Self {
            conversations: Mutex::new(HashMap::new()),
            system_prompt: system_prompt.into(),
            limit,
            policy,
        }
    }

    fn seed(&self) -> Vec<ChatMessage> {
        vec![ChatMessage::system(self.system_prompt.clone())]
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn append(&self, conversation_id: ChatId, role: Role, content: &str) {
        let mut conversations = self.conversations.lock().await;
        let messages = conversations
            .entry(conversation_id)
            .or_insert_with(|| self.seed());
        messages.push(ChatMessage::new(role, content));
        trim_history(messages, self.limit, self.policy);
        debug!("Conversation {} now holds {} messages", conversation_id, messages.len());
    }

    async fn get(&self, conversation_id: ChatId) -> Conversation {
        let mut conversations = self.conversations.lock().await;
        let messages = conversations
            .entry(conversation_id)
            .or_insert_with(|| self.seed())
            .clone();

        Conversation {
            id: conversation_id,
            messages,
        }
    }
}
