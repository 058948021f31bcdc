use serde::{ Serialize, Deserialize };

use super::chat::{ ChatId, InboundMessage, OutboundMessage };

#[derive(Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub business_message: Option<Message>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
    #[serde(default)]
    pub entities: Vec<MessageEntity>,
    pub business_connection_id: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Chat {
    pub id: ChatId,
}

#[derive(Deserialize, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: i64,
    pub length: i64,
}

#[derive(Serialize, Debug)]
pub struct GetUpdatesRequest {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: Vec<String>,
}

#[derive(Serialize, Debug)]
pub struct ReplyParameters {
    pub message_id: i64,
}

#[derive(Serialize, Debug)]
pub struct SendMessageRequest {
    pub chat_id: ChatId,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_parameters: Option<ReplyParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_connection_id: Option<String>,
}

impl From<&OutboundMessage> for SendMessageRequest {
    fn from(msg: &OutboundMessage) -> Self {
        Self {
            chat_id: msg.chat_id,
            text: msg.text.clone(),
            reply_parameters: msg.reply_to.map(|message_id| ReplyParameters { message_id }),
            business_connection_id: msg.business_connection_id.clone(),
        }
    }
}

impl User {
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.id.to_string(),
        }
    }
}

impl Message {
    /// Telegram marks commands with a `bot_command` entity at offset 0.
    pub fn is_command(&self) -> bool {
        self.entities.iter().any(|e| e.kind == "bot_command" && e.offset == 0)
    }
}

impl Update {
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let message = self.message.or(self.business_message)?;
        let is_command = message.is_command();
        let sender = message.from
            .as_ref()
            .map(|u| u.display_name())
            .unwrap_or_else(|| message.chat.id.to_string());

        Some(InboundMessage {
            chat_id: message.chat.id,
            message_id: Some(message.message_id),
            sender,
            text: message.text,
            is_command,
            business_connection_id: message.business_connection_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Update {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn text_message_becomes_inbound() {
        let update = parse(
            r#"{"update_id":7,"message":{"message_id":3,"chat":{"id":42},
                "from":{"id":9,"username":"damian"},"text":"Hello"}}"#
        );
        let inbound = update.into_inbound().unwrap();
        assert_eq!(inbound.chat_id, 42);
        assert_eq!(inbound.message_id, Some(3));
        assert_eq!(inbound.sender, "damian");
        assert_eq!(inbound.text.as_deref(), Some("Hello"));
        assert!(!inbound.is_command);
    }

    #[test]
    fn sender_falls_back_to_user_id() {
        let update = parse(
            r#"{"update_id":1,"message":{"message_id":1,"chat":{"id":5},"from":{"id":77},"text":"hi"}}"#
        );
        assert_eq!(update.into_inbound().unwrap().sender, "77");
    }

    #[test]
    fn sticker_has_no_text() {
        let update = parse(
            r#"{"update_id":1,"message":{"message_id":1,"chat":{"id":5},"sticker":{"file_id":"x"}}}"#
        );
        assert_eq!(update.into_inbound().unwrap().text, None);
    }

    #[test]
    fn command_entity_is_detected() {
        let update = parse(
            r#"{"update_id":1,"message":{"message_id":1,"chat":{"id":5},"text":"/start",
                "entities":[{"type":"bot_command","offset":0,"length":6}]}}"#
        );
        assert!(update.into_inbound().unwrap().is_command);
    }

    #[test]
    fn business_message_keeps_connection_id() {
        let update = parse(
            r#"{"update_id":1,"business_message":{"message_id":4,"chat":{"id":8},
                "text":"!hi","business_connection_id":"bc-1"}}"#
        );
        let inbound = update.into_inbound().unwrap();
        assert_eq!(inbound.business_connection_id.as_deref(), Some("bc-1"));
        assert_eq!(inbound.sender, "8");
    }

    #[test]
    fn update_without_message_is_skipped() {
        let update = parse(r#"{"update_id":1,"edited_message":{"message_id":1,"chat":{"id":5}}}"#);
        assert!(update.into_inbound().is_none());
    }

    #[test]
    fn reply_parameters_only_serialized_when_present() {
        let plain = SendMessageRequest::from(
            &(OutboundMessage {
                chat_id: 1,
                text: "x".into(),
                reply_to: None,
                business_connection_id: None,
            })
        );
        let json = serde_json::to_value(&plain).unwrap();
        assert!(json.get("reply_parameters").is_none());

        let reply = SendMessageRequest::from(
            &(OutboundMessage {
                chat_id: 1,
                text: "x".into(),
                reply_to: Some(12),
                business_connection_id: None,
            })
        );
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["reply_parameters"]["message_id"], 12);
    }
}
