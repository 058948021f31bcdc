use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{ Duration, Instant };

use crate::models::chat::ChatId;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(1200);

/// Minimum interval between accepted messages, per conversation.
///
/// Rejected messages are dropped by the caller and leave the recorded
/// instant unchanged, so a burst cannot push the window forward.
pub struct ChatRateLimiter {
    delay: Duration,
    last_call: Mutex<HashMap<ChatId, Instant>>,
}

impl ChatRateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_call: Mutex::new(HashMap::new()),
        }
    }

    pub fn admit(&self, conversation_id: ChatId, now: Instant) -> bool {
        let mut last_call = match self.last_call.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let allowed = match last_call.get(&conversation_id) {
            Some(previous) => now.saturating_duration_since(*previous) >= self.delay,
            None => true,
        };
        if allowed {
            last_call.insert(conversation_id, now);
        }
        allowed
    }

    pub fn last_admitted(&self, conversation_id: ChatId) -> Option<Instant> {
        let last_call = match self.last_call.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        last_call.get(&conversation_id).copied()
    }
}

impl Default for ChatRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}
