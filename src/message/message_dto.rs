use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::message::message_models::MessageStatus;

/// Raw attachment input. Entries without a storage path are dropped rather
/// than rejected; see `build_attachments`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AttachmentInput {
    pub path: String,
    pub mime_type: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendMessageRequest {
    pub recipient_id: Uuid,
    #[validate(length(max = 4096, message = "Message body cannot exceed 4096 characters"))]
    pub body: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentInput>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMessageRequest {
    #[validate(length(min = 1, max = 4096, message = "Message body must be 1-4096 characters"))]
    pub body: Option<String>,
    pub status: Option<MessageStatus>,
}

/// Query parameters for the message listing endpoint. Exactly one addressing
/// mode is required: a conversation id, or a peer user id. When both are
/// present the conversation id wins.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListMessagesQuery {
    pub conversation_id: Option<Uuid>,
    /// Peer user id; selects messages between the caller and this user.
    pub with_user: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListConversationsQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}
