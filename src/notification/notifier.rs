use std::sync::Arc;

use tracing::{debug, error};

use super::notification_models::NotificationType;
use super::notification_repository::NotificationRepository;
use super::push::PushProvider;
use crate::error::Result;
use crate::message::message_models::{Attachment, MessageResponse};
use crate::user::UserRepository;
use crate::websocket::types::{message_topic, NewMessagePayload, WsMessage};
use crate::websocket::ConnectionManager;

const PUSH_TITLE: &str = "New Message";
const PREVIEW_MAX_CHARS: usize = 50;

/// Fans a persisted message out to the recipient: realtime frame, durable
/// notification row and mobile push. The message is already committed when
/// this runs, so every channel is best-effort.
#[derive(Clone)]
pub struct Notifier {
    ws: ConnectionManager,
    push: Arc<dyn PushProvider>,
    notifications: NotificationRepository,
    users: UserRepository,
}

impl Notifier {
    pub fn new(
        ws: ConnectionManager,
        push: Arc<dyn PushProvider>,
        notifications: NotificationRepository,
        users: UserRepository,
    ) -> Self {
        Self {
            ws,
            push,
            notifications,
            users,
        }
    }

    /// The three channels run concurrently and fail independently; errors
    /// are logged here and never reach the send path.
    pub async fn notify_new_message(&self, message: &MessageResponse) {
        let realtime = async {
            let frame = WsMessage::NewMessage(NewMessagePayload {
                topic: message_topic(message.conversation_id),
                message: message.clone(),
            });
            if !self.ws.send_to_user(&message.recipient_id, frame) {
                debug!("Recipient {} has no live session", message.recipient_id);
            }
        };

        let durable = async {
            let body = build_preview(
                &message.sender_name,
                message.body.as_deref(),
                &message.attachments,
            );
            if let Err(e) = self
                .notifications
                .create(
                    message.recipient_id,
                    message.sender_id,
                    Some(message.id),
                    NotificationType::NewMessage,
                    &body,
                )
                .await
            {
                error!("Failed to record notification for message {}: {:?}", message.id, e);
            }
        };

        let push = async {
            match self.users.find_push_tokens(message.recipient_id).await {
                Ok(tokens) => {
                    if let Err(e) = dispatch_push(self.push.as_ref(), &tokens, message).await {
                        error!("Push dispatch failed for message {}: {:?}", message.id, e);
                    }
                }
                Err(e) => {
                    error!(
                        "Failed to load push tokens for user {}: {:?}",
                        message.recipient_id, e
                    );
                }
            }
        };

        tokio::join!(realtime, durable, push);
    }
}

/// Sends the push for one message. Skips silently when the recipient has no
/// registered devices; otherwise all tokens go out in one batched call.
async fn dispatch_push(
    provider: &dyn PushProvider,
    tokens: &[String],
    message: &MessageResponse,
) -> Result<()> {
    if tokens.is_empty() {
        return Ok(());
    }

    let body = build_preview(
        &message.sender_name,
        message.body.as_deref(),
        &message.attachments,
    );
    let data = serde_json::json!({
        "notification_type": "new_message",
        "conversation_id": message.conversation_id,
        "message_id": message.id,
    });

    provider.notify(tokens, PUSH_TITLE, &body, data).await
}

/// Human-readable one-liner for notification rows and push bodies.
pub fn build_preview(sender_name: &str, body: Option<&str>, attachments: &[Attachment]) -> String {
    match body {
        Some(text) if !text.trim().is_empty() => {
            format!(
                "New message from {}: {}",
                sender_name,
                truncate_chars(text, PREVIEW_MAX_CHARS)
            )
        }
        _ if !attachments.is_empty() => {
            format!("New message from {}: [attachment]", sender_name)
        }
        _ => format!("New message from {}", sender_name),
    }
}

// Truncates on char boundaries so multibyte text cannot split mid-character.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::message_models::MessageStatus;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingPush {
        calls: Mutex<Vec<(usize, String, String)>>,
    }

    #[async_trait]
    impl PushProvider for RecordingPush {
        async fn notify(
            &self,
            tokens: &[String],
            title: &str,
            body: &str,
            _data: serde_json::Value,
        ) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((tokens.len(), title.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn sample_message(body: Option<&str>) -> MessageResponse {
        MessageResponse {
            id: Uuid::new_v4(),
            conversation_id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            sender_name: "ada".to_string(),
            recipient_id: Uuid::new_v4(),
            body: body.map(str::to_string),
            attachments: vec![],
            status: MessageStatus::Sent,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_push_skips_without_tokens() {
        let provider = RecordingPush::default();
        let message = sample_message(Some("hi"));

        dispatch_push(&provider, &[], &message).await.unwrap();

        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_push_batches_all_tokens_in_one_call() {
        let provider = RecordingPush::default();
        let message = sample_message(Some("hi"));
        let tokens = vec!["token-a".to_string(), "token-b".to_string()];

        dispatch_push(&provider, &tokens, &message).await.unwrap();

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, 2);
        assert_eq!(calls[0].1, "New Message");
        assert!(calls[0].2.contains("ada"));
    }

    #[test]
    fn test_build_preview_truncates_long_text() {
        let long = "x".repeat(80);
        let preview = build_preview("ada", Some(&long), &[]);
        assert!(preview.ends_with("..."));
        assert!(preview.len() < 80);
    }

    #[test]
    fn test_build_preview_survives_multibyte_text() {
        let text = "こんにちは".repeat(20);
        let preview = build_preview("ada", Some(&text), &[]);
        assert!(preview.starts_with("New message from ada: こんにちは"));
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_build_preview_for_attachment_only_message() {
        let attachments = vec![Attachment {
            path: "uploads/a.png".to_string(),
            mime_type: "image/png".to_string(),
        }];
        assert_eq!(
            build_preview("ada", None, &attachments),
            "New message from ada: [attachment]"
        );
    }
}
