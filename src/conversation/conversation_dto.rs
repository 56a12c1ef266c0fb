use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::conversation::conversation_models::ConversationStatus;
use crate::message::message_models::{Attachment, MessageStatus};

/// Joined row backing the conversation list: the conversation itself, the
/// peer's directory entry and its most recent message. Conversations with
/// no message yet are excluded by the join.
#[derive(Debug, sqlx::FromRow)]
pub struct ConversationListRow {
    pub id: Uuid,
    pub initiator_id: Uuid,
    pub status: ConversationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub peer_id: Uuid,
    pub peer_username: String,
    pub peer_avatar_url: Option<String>,
    pub last_message_id: Uuid,
    pub last_message_sender_id: Uuid,
    pub last_message_body: Option<String>,
    pub last_message_attachments: Json<Vec<Attachment>>,
    pub last_message_status: MessageStatus,
    pub last_message_created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PeerProfile {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LastMessagePreview {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub body: Option<String>,
    /// Mime types of any attachments, so clients can render an icon without
    /// fetching the full message.
    pub attachment_types: Vec<String>,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

/// One entry of the conversation overview screen.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationEntry {
    pub id: Uuid,
    pub status: ConversationStatus,
    pub initiator_id: Uuid,
    pub peer: PeerProfile,
    pub last_message: LastMessagePreview,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ConversationListRow> for ConversationEntry {
    fn from(row: ConversationListRow) -> Self {
        Self {
            id: row.id,
            status: row.status,
            initiator_id: row.initiator_id,
            peer: PeerProfile {
                id: row.peer_id,
                username: row.peer_username,
                avatar_url: row.peer_avatar_url,
            },
            last_message: LastMessagePreview {
                id: row.last_message_id,
                sender_id: row.last_message_sender_id,
                body: row.last_message_body,
                attachment_types: row
                    .last_message_attachments
                    .0
                    .into_iter()
                    .map(|attachment| attachment.mime_type)
                    .collect(),
                status: row.last_message_status,
                created_at: row.last_message_created_at,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_row_maps_attachment_types() {
        let row = ConversationListRow {
            id: Uuid::new_v4(),
            initiator_id: Uuid::new_v4(),
            status: ConversationStatus::Accepted,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            peer_id: Uuid::new_v4(),
            peer_username: "grace".to_string(),
            peer_avatar_url: None,
            last_message_id: Uuid::new_v4(),
            last_message_sender_id: Uuid::new_v4(),
            last_message_body: None,
            last_message_attachments: Json(vec![
                Attachment {
                    path: "uploads/a.png".to_string(),
                    mime_type: "image/png".to_string(),
                },
                Attachment {
                    path: "uploads/b.pdf".to_string(),
                    mime_type: "application/pdf".to_string(),
                },
            ]),
            last_message_status: MessageStatus::Sent,
            last_message_created_at: Utc::now(),
        };

        let entry = ConversationEntry::from(row);
        assert_eq!(entry.peer.username, "grace");
        assert_eq!(
            entry.last_message.attachment_types,
            vec!["image/png".to_string(), "application/pdf".to_string()]
        );
        assert!(entry.last_message.body.is_none());
    }
}
