use std::sync::Arc;

use async_trait::async_trait;
use fcm::{Client, MessageBuilder, NotificationBuilder};
use tracing::{error, info, warn};

use crate::error::{AppError, Result};

/// Mobile push transport. Best-effort: callers treat a returned error as a
/// delivery-quality problem, never as a send failure.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Delivers one notification to all given device tokens in a single
    /// batched call. An empty token list is a no-op.
    async fn notify(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> Result<()>;
}

/// Firebase Cloud Messaging provider.
#[derive(Clone)]
pub struct FcmPush {
    client: Arc<Client>,
    api_key: String,
}

impl FcmPush {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Arc::new(Client::new()),
            api_key,
        }
    }
}

#[async_trait]
impl PushProvider for FcmPush {
    async fn notify(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> Result<()> {
        if tokens.is_empty() {
            return Ok(());
        }

        let mut notification_builder = NotificationBuilder::new();
        notification_builder.title(title).body(body).sound("default");
        let notification = notification_builder.finalize();

        let token_refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
        let mut message_builder = MessageBuilder::new_multi(&self.api_key, &token_refs);
        message_builder.notification(notification);
        if message_builder.data(&data).is_err() {
            warn!("Push data payload is not a JSON object; sending without it");
        }

        match self.client.send(message_builder.finalize()).await {
            Ok(response) => {
                info!(
                    "Push notification sent to {} device(s) (message_id: {:?})",
                    tokens.len(),
                    response.message_id
                );
                Ok(())
            }
            Err(e) => {
                error!("FCM send failed: {}", e);
                Err(AppError::InternalError)
            }
        }
    }
}
