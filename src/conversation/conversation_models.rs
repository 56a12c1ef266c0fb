use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle state of a two-party conversation. A conversation starts as
/// `Pending` when the initiator sends the first message and only the
/// recipient's action (or a reply, which implies acceptance) moves it on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl std::fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationStatus::Pending => write!(f, "pending"),
            ConversationStatus::Accepted => write!(f, "accepted"),
            ConversationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Conversation {
    pub id: Uuid,
    pub initiator_id: Uuid,
    pub recipient_id: Uuid,
    pub status: ConversationStatus,
    pub last_message_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Returns true when the given user is one of the two participants.
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.initiator_id == user_id || self.recipient_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ConversationStatus::Pending).unwrap(),
            "\"pending\""
        );
        let status: ConversationStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(status, ConversationStatus::Rejected);
    }

    #[test]
    fn test_involves_checks_both_parties() {
        let initiator = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            initiator_id: initiator,
            recipient_id: recipient,
            status: ConversationStatus::Pending,
            last_message_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(conversation.involves(initiator));
        assert!(conversation.involves(recipient));
        assert!(!conversation.involves(Uuid::new_v4()));
    }
}
