use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Read,
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageStatus::Sent => write!(f, "sent"),
            MessageStatus::Read => write!(f, "read"),
        }
    }
}

/// A file reference carried by a message. The server stores the path and
/// content type as supplied; it does not host the file itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Attachment {
    pub path: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub body: Option<String>,
    #[schema(value_type = Vec<Attachment>)]
    pub attachments: Json<Vec<Attachment>>,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

/// Wire shape for a delivered message, shared by REST responses and the
/// realtime channel so clients parse one format everywhere.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub recipient_id: Uuid,
    pub body: Option<String>,
    pub attachments: Vec<Attachment>,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

impl MessageResponse {
    pub fn from_message(message: Message, sender_name: String) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            sender_name,
            recipient_id: message.recipient_id,
            body: message.body,
            attachments: message.attachments.0,
            status: message.status,
            created_at: message.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_status_serialization() {
        assert_eq!(serde_json::to_string(&MessageStatus::Sent).unwrap(), "\"sent\"");
        assert_eq!(serde_json::to_string(&MessageStatus::Read).unwrap(), "\"read\"");

        let status: MessageStatus = serde_json::from_str("\"read\"").unwrap();
        assert_eq!(status, MessageStatus::Read);
    }

    #[test]
    fn test_message_response_flattens_attachments() {
        let message = Message {
            id: Uuid::new_v4(),
            conversation_id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
            body: Some("hello".to_string()),
            attachments: Json(vec![Attachment {
                path: "uploads/photo.png".to_string(),
                mime_type: "image/png".to_string(),
            }]),
            status: MessageStatus::Sent,
            created_at: Utc::now(),
        };

        let response = MessageResponse::from_message(message, "ada".to_string());
        assert_eq!(response.sender_name, "ada");
        assert_eq!(response.attachments.len(), 1);
        assert_eq!(response.attachments[0].mime_type, "image/png");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "sent");
        assert!(json["attachments"].is_array());
    }
}
