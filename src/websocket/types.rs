use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::message::message_dto::AttachmentInput;
use crate::message::message_models::MessageResponse;

/// Realtime event topic for one conversation. Clients subscribe per
/// conversation and match incoming frames against this name.
pub fn message_topic(conversation_id: Uuid) -> String {
    format!("newMessage_{}", conversation_id)
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    NewMessage(NewMessagePayload),
    TypingIndicator(TypingIndicatorPayload),
    UserStatus(UserStatusPayload),
    Error(ErrorPayload),
    Pong,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewMessagePayload {
    pub topic: String,
    pub message: MessageResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TypingIndicatorPayload {
    pub user_id: Uuid,
    pub is_typing: bool,
    pub conversation_with: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserStatusPayload {
    pub user_id: Uuid,
    pub is_online: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorPayload {
    pub message: String,
}

// Client-to-server messages
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    SendMessage {
        recipient_id: Uuid,
        body: Option<String>,
        #[serde(default)]
        attachments: Vec<AttachmentInput>,
    },
    TypingIndicator {
        conversation_with: Uuid,
        is_typing: bool,
    },
    MarkRead {
        conversation_id: Uuid,
    },
    Ping,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::message_models::MessageStatus;
    use chrono::Utc;

    #[test]
    fn test_message_topic_embeds_conversation_id() {
        let id = Uuid::new_v4();
        assert_eq!(message_topic(id), format!("newMessage_{}", id));
    }

    #[test]
    fn test_new_message_frame_shape() {
        let conversation_id = Uuid::new_v4();
        let frame = WsMessage::NewMessage(NewMessagePayload {
            topic: message_topic(conversation_id),
            message: MessageResponse {
                id: Uuid::new_v4(),
                conversation_id,
                sender_id: Uuid::new_v4(),
                sender_name: "ada".to_string(),
                recipient_id: Uuid::new_v4(),
                body: Some("hi".to_string()),
                attachments: vec![],
                status: MessageStatus::Sent,
                created_at: Utc::now(),
            },
        });

        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "new_message");
        assert_eq!(
            json["topic"],
            serde_json::Value::String(format!("newMessage_{}", conversation_id))
        );
        assert_eq!(json["message"]["body"], "hi");
    }

    #[test]
    fn test_client_message_parsing() {
        let text = r#"{"type":"send_message","recipient_id":"5f0cbd52-9c98-4f13-b2a7-48a0c1f4b024","body":"hello"}"#;
        let parsed: ClientMessage = serde_json::from_str(text).unwrap();
        match parsed {
            ClientMessage::SendMessage {
                body, attachments, ..
            } => {
                assert_eq!(body.as_deref(), Some("hello"));
                assert!(attachments.is_empty());
            }
            other => panic!("unexpected variant: {:?}", other),
        }

        let ping: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(ping, ClientMessage::Ping));
    }
}
