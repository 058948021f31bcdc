use crate::error::BotError;
use crate::history::ConversationStore;
use crate::llm::chat::ChatClient;
use crate::logs::LogBuffer;
use crate::models::chat::{ InboundMessage, OutboundMessage, Role };
use crate::rate_limit::ChatRateLimiter;
use crate::telegram::Messenger;

use log::{ error, info, warn, Level };
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerMode {
    /// Every plain text message is relayed; bot commands are ignored.
    Relay,
    /// Only messages starting with `prefix` are relayed, without the prefix.
    Command {
        prefix: String,
    },
}

impl HandlerMode {
    pub fn parse(mode: &str, prefix: &str) -> Result<Self, BotError> {
        match mode.to_lowercase().as_str() {
            "relay" => Ok(HandlerMode::Relay),
            "command" => {
                if prefix.is_empty() {
                    return Err(BotError::Config("Command mode needs a non-empty prefix".to_string()));
                }
                Ok(HandlerMode::Command { prefix: prefix.to_string() })
            }
            _ => Err(BotError::Config(format!("Unsupported handler mode: {}", mode))),
        }
    }

    fn prompt<'a>(&self, inbound: &'a InboundMessage) -> Option<&'a str> {
        let text = inbound.text.as_deref().filter(|t| !t.is_empty())?;
        match self {
            HandlerMode::Relay if inbound.is_command => None,
            HandlerMode::Relay => Some(text),
            HandlerMode::Command { prefix } => {
                let rest = text.strip_prefix(prefix.as_str())?.trim();
                if rest.is_empty() { None } else { Some(rest) }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    RateLimited,
    Replied(String),
    DeliveryFailed(String),
}

pub struct RelayAgent {
    store: Arc<dyn ConversationStore>,
    limiter: Arc<ChatRateLimiter>,
    chat_client: Arc<dyn ChatClient>,
    messenger: Arc<dyn Messenger>,
    journal: Arc<LogBuffer>,
    mode: HandlerMode,
}

impl RelayAgent {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        limiter: Arc<ChatRateLimiter>,
        chat_client: Arc<dyn ChatClient>,
        messenger: Arc<dyn Messenger>,
        journal: Arc<LogBuffer>,
        mode: HandlerMode
    ) -> Self {
        Self {
            store,
            limiter,
            chat_client,
            messenger,
            journal,
            mode,
        }
    }

    fn record(&self, level: Level, line: String) {
        log::log!(level, "{}", line);
        self.journal.push(line);
    }

    pub async fn handle(&self, inbound: InboundMessage, now: Instant) -> Outcome {
        let Some(prompt) = self.mode.prompt(&inbound) else {
            return Outcome::Ignored;
        };
        let chat_id = inbound.chat_id;

        self.record(Level::Info, format!("[{}] {}: {}", chat_id, inbound.sender, prompt));

        if !self.limiter.admit(chat_id, now) {
            self.record(Level::Warn, format!("[RATE-LIMIT] [{}] {}", chat_id, BotError::RateLimited));
            return Outcome::RateLimited;
        }

        self.store.append(chat_id, Role::User, prompt).await;
        let conversation = self.store.get(chat_id).await;

        let reply = match self.chat_client.complete(&conversation.messages).await {
            Ok(resp) => {
                self.store.append(chat_id, Role::Assistant, &resp.response).await;
                resp.response
            }
            Err(e) => {
                error!("Completion for chat {} failed via {}: {}", chat_id, self.chat_client.get_model(), e);
                e.user_reply()
            }
        };

        self.record(Level::Info, format!("[{}] AI: {}", chat_id, reply));

        let outbound = OutboundMessage {
            chat_id,
            text: reply.clone(),
            reply_to: match self.mode {
                HandlerMode::Command { .. } => inbound.message_id,
                HandlerMode::Relay => None,
            },
            business_connection_id: inbound.business_connection_id,
        };

        match self.messenger.send(&outbound).await {
            Ok(()) => {
                info!("Reply delivered to chat {}", chat_id);
                Outcome::Replied(reply)
            }
            Err(e) => {
                warn!("Continuing after delivery failure for chat {}", chat_id);
                self.record(Level::Error, format!("[DELIVERY-ERROR] [{}] {}", chat_id, e));
                Outcome::DeliveryFailed(reply)
            }
        }
    }
}
