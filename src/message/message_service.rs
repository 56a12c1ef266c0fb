use uuid::Uuid;
use validator::Validate;

use crate::conversation::conversation_dto::ConversationEntry;
use crate::conversation::conversation_service::ConversationService;
use crate::error::{AppError, Result};
use crate::message::message_dto::{
    AttachmentInput, ListMessagesQuery, PaginatedResponse, SendMessageRequest,
    UpdateMessageRequest,
};
use crate::message::message_models::{Attachment, Message, MessageResponse};
use crate::message::message_repository::MessageRepository;
use crate::notification::Notifier;
use crate::user::UserRepository;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

#[derive(Clone)]
pub struct MessageService {
    repo: MessageRepository,
    conversations: ConversationService,
    users: UserRepository,
    notifier: Notifier,
}

impl MessageService {
    pub fn new(
        repo: MessageRepository,
        conversations: ConversationService,
        users: UserRepository,
        notifier: Notifier,
    ) -> Self {
        Self {
            repo,
            conversations,
            users,
            notifier,
        }
    }

    /// Sends a message: resolves the conversation, persists the message,
    /// bumps the conversation's last message pointer and fans out the
    /// notifications. Fan-out failures never fail the send.
    pub async fn send_message(
        &self,
        sender_id: Uuid,
        payload: SendMessageRequest,
    ) -> Result<MessageResponse> {
        payload.validate()?;

        if payload.recipient_id == sender_id {
            return Err(AppError::InvalidArgument(
                "Cannot send a message to yourself".to_string(),
            ));
        }

        let attachments = build_attachments(&payload.attachments);
        let body = payload
            .body
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty());
        if body.is_none() && attachments.is_empty() {
            return Err(AppError::InvalidArgument(
                "Message needs a body or at least one attachment".to_string(),
            ));
        }

        let sender = self
            .users
            .find_by_id(sender_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Sender not found".to_string()))?;
        self.users
            .find_by_id(payload.recipient_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Recipient not found".to_string()))?;

        let conversation = self
            .conversations
            .resolve_for_send(sender_id, payload.recipient_id)
            .await?;

        let message = self
            .repo
            .create(
                conversation.id,
                sender_id,
                payload.recipient_id,
                body,
                attachments,
            )
            .await?;

        self.conversations
            .record_last_message(conversation.id, message.id)
            .await?;

        let response = MessageResponse::from_message(message, sender.username);
        self.notifier.notify_new_message(&response).await;

        Ok(response)
    }

    /// One page of messages, newest first, addressed either by conversation
    /// id or by peer user id. The conversation id wins when both are given.
    pub async fn list_messages(
        &self,
        caller_id: Uuid,
        query: ListMessagesQuery,
    ) -> Result<PaginatedResponse<Message>> {
        let page = normalize_page(query.page);
        let limit = normalize_limit(query.limit);
        let offset = page_offset(page, limit);

        let (messages, total) = match resolve_scope(query.conversation_id, query.with_user)? {
            MessageScope::Conversation(conversation_id) => {
                self.conversations
                    .find_for_participant(conversation_id, caller_id)
                    .await?;
                let messages = self
                    .repo
                    .find_by_conversation(conversation_id, limit as i64, offset)
                    .await?;
                let total = self.repo.count_by_conversation(conversation_id).await?;
                (messages, total)
            }
            MessageScope::Pair(peer_id) => {
                let messages = self
                    .repo
                    .find_by_pair(caller_id, peer_id, limit as i64, offset)
                    .await?;
                let total = self.repo.count_by_pair(caller_id, peer_id).await?;
                (messages, total)
            }
        };

        Ok(PaginatedResponse {
            data: messages,
            total,
            page,
            limit,
            total_pages: total_pages(total, limit),
        })
    }

    /// The caller's conversation overview, sorted by last activity. An empty
    /// or whitespace-only search keyword matches everything.
    pub async fn list_conversations(
        &self,
        user_id: Uuid,
        search: Option<&str>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<PaginatedResponse<ConversationEntry>> {
        let page = normalize_page(page);
        let limit = normalize_limit(limit);
        let offset = page_offset(page, limit);

        let search = search.map(str::trim).filter(|keyword| !keyword.is_empty());

        let rows = self
            .conversations
            .list_overview(user_id, search, limit as i64, offset)
            .await?;
        let total = self.conversations.count_overview(user_id, search).await?;

        Ok(PaginatedResponse {
            data: rows.into_iter().map(ConversationEntry::from).collect(),
            total,
            page,
            limit,
            total_pages: total_pages(total, limit),
        })
    }

    /// Marks every message addressed to `user_id` in the conversation read.
    /// Both references must point at existing rows.
    pub async fn mark_conversation_read(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64> {
        self.conversations
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| {
                AppError::InvalidArgument("Conversation does not exist".to_string())
            })?;
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::InvalidArgument("User does not exist".to_string()))?;

        self.repo.mark_conversation_read(conversation_id, user_id).await
    }

    /// Applies the supplied fields to a message. Body edits are restricted
    /// to the sender; status changes to either participant.
    pub async fn update_message(
        &self,
        caller_id: Uuid,
        message_id: Uuid,
        payload: UpdateMessageRequest,
    ) -> Result<Message> {
        payload.validate()?;

        let existing = self
            .repo
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

        authorize_update(&existing, caller_id, payload.body.is_some())?;

        self.repo
            .update(message_id, payload.body.as_deref(), payload.status)
            .await?
            .ok_or_else(|| AppError::NotFound("Message not found".to_string()))
    }

    /// Deletes the caller's own message and returns the removed row.
    pub async fn delete_message(&self, caller_id: Uuid, message_id: Uuid) -> Result<Message> {
        let existing = self
            .repo
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

        if existing.sender_id != caller_id {
            return Err(AppError::Forbidden(
                "Only the sender can delete a message".to_string(),
            ));
        }

        self.repo
            .delete(message_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Message not found".to_string()))
    }
}

/// Keeps only inputs carrying a non-empty storage path.
pub fn build_attachments(inputs: &[AttachmentInput]) -> Vec<Attachment> {
    inputs
        .iter()
        .filter(|input| !input.path.trim().is_empty())
        .map(|input| Attachment {
            path: input.path.clone(),
            mime_type: input.mime_type.clone(),
        })
        .collect()
}

fn authorize_update(message: &Message, caller_id: Uuid, edits_body: bool) -> Result<()> {
    let is_sender = message.sender_id == caller_id;
    let is_recipient = message.recipient_id == caller_id;

    if !is_sender && !is_recipient {
        return Err(AppError::Forbidden(
            "You are not part of this message".to_string(),
        ));
    }
    if edits_body && !is_sender {
        return Err(AppError::Forbidden(
            "Only the sender can edit the message body".to_string(),
        ));
    }

    Ok(())
}

/// How a message listing is addressed. The conversation id takes
/// precedence when both parameters are supplied.
#[derive(Debug, PartialEq, Eq)]
enum MessageScope {
    Conversation(Uuid),
    Pair(Uuid),
}

fn resolve_scope(conversation_id: Option<Uuid>, with_user: Option<Uuid>) -> Result<MessageScope> {
    match (conversation_id, with_user) {
        (Some(conversation_id), _) => Ok(MessageScope::Conversation(conversation_id)),
        (None, Some(peer_id)) => Ok(MessageScope::Pair(peer_id)),
        (None, None) => Err(AppError::InvalidArgument(
            "Provide a conversation_id or a with_user peer".to_string(),
        )),
    }
}

fn normalize_page(page: Option<u32>) -> u32 {
    page.unwrap_or(DEFAULT_PAGE).max(1)
}

fn normalize_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

fn page_offset(page: u32, limit: u32) -> i64 {
    (page as i64 - 1) * limit as i64
}

fn total_pages(total: i64, limit: u32) -> u32 {
    if total <= 0 {
        0
    } else {
        ((total + limit as i64 - 1) / limit as i64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::message_models::MessageStatus;
    use chrono::Utc;
    use sqlx::types::Json;

    #[test]
    fn test_build_attachments_skips_entries_without_path() {
        let inputs = vec![
            AttachmentInput {
                path: "uploads/a.png".to_string(),
                mime_type: "image/png".to_string(),
            },
            AttachmentInput {
                path: "   ".to_string(),
                mime_type: "image/jpeg".to_string(),
            },
            AttachmentInput {
                path: String::new(),
                mime_type: "application/pdf".to_string(),
            },
            AttachmentInput {
                path: "uploads/b.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
            },
        ];

        let attachments = build_attachments(&inputs);
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].path, "uploads/a.png");
        assert_eq!(attachments[1].path, "uploads/b.pdf");
    }

    #[test]
    fn test_resolve_scope_requires_an_addressing_mode() {
        let conversation_id = Uuid::new_v4();
        let peer_id = Uuid::new_v4();

        assert_eq!(
            resolve_scope(Some(conversation_id), None).unwrap(),
            MessageScope::Conversation(conversation_id)
        );
        assert_eq!(
            resolve_scope(None, Some(peer_id)).unwrap(),
            MessageScope::Pair(peer_id)
        );
        assert_eq!(
            resolve_scope(Some(conversation_id), Some(peer_id)).unwrap(),
            MessageScope::Conversation(conversation_id)
        );
        assert!(matches!(
            resolve_scope(None, None),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_page_offset_starts_at_zero() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(3, 10), 20);
        assert_eq!(page_offset(2, 100), 100);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(95, 10), 10);
    }

    #[test]
    fn test_pagination_defaults_and_clamps() {
        assert_eq!(normalize_page(None), 1);
        assert_eq!(normalize_page(Some(0)), 1);
        assert_eq!(normalize_page(Some(7)), 7);

        assert_eq!(normalize_limit(None), 10);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(500)), 100);
    }

    fn message(sender_id: Uuid, recipient_id: Uuid) -> Message {
        Message {
            id: Uuid::new_v4(),
            conversation_id: Uuid::new_v4(),
            sender_id,
            recipient_id,
            body: Some("hi".to_string()),
            attachments: Json(vec![]),
            status: MessageStatus::Sent,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_authorize_update_guards_body_edits() {
        let sender = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let message = message(sender, recipient);

        assert!(authorize_update(&message, sender, true).is_ok());
        assert!(authorize_update(&message, recipient, true).is_err());
        // Either participant may flip the status.
        assert!(authorize_update(&message, recipient, false).is_ok());
        assert!(authorize_update(&message, Uuid::new_v4(), false).is_err());
    }
}
