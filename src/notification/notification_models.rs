use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewMessage,
}

/// Durable in-app notification. Survives the recipient being offline at
/// send time, unlike the realtime and push channels.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    /// The user whose message triggered this notification.
    pub messenger_id: Uuid,
    pub message_id: Option<Uuid>,
    pub notification_type: NotificationType,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
