use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::message::message_models::{Attachment, Message, MessageStatus};

#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        recipient_id: Uuid,
        body: Option<&str>,
        attachments: Vec<Attachment>,
    ) -> Result<Message> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (conversation_id, sender_id, recipient_id, body, attachments)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(conversation_id)
        .bind(sender_id)
        .bind(recipient_id)
        .bind(body)
        .bind(Json(attachments))
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>> {
        let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(message)
    }

    /// Applies only the supplied fields and returns the updated row, or
    /// `None` when no row matches.
    pub async fn update(
        &self,
        id: Uuid,
        body: Option<&str>,
        status: Option<MessageStatus>,
    ) -> Result<Option<Message>> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            UPDATE messages
            SET body = COALESCE($2, body),
                status = COALESCE($3, status)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(body)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    /// Deletes the row and hands it back, so callers can echo what was
    /// removed. The conversation's last message pointer is cleared by the
    /// foreign key's ON DELETE SET NULL.
    pub async fn delete(&self, id: Uuid) -> Result<Option<Message>> {
        let message =
            sqlx::query_as::<_, Message>("DELETE FROM messages WHERE id = $1 RETURNING *")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(message)
    }

    /// Marks every not-yet-read message addressed to `recipient_id` in the
    /// conversation as read. Returns how many rows changed.
    pub async fn mark_conversation_read(
        &self,
        conversation_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET status = 'read'
            WHERE conversation_id = $1 AND recipient_id = $2 AND status <> 'read'
            "#,
        )
        .bind(conversation_id)
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn find_by_conversation(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(conversation_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn count_by_conversation(&self, conversation_id: Uuid) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages WHERE conversation_id = $1",
        )
        .bind(conversation_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Messages exchanged between two users in either direction.
    pub async fn find_by_pair(
        &self,
        user_a: Uuid,
        user_b: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn count_by_pair(&self, user_a: Uuid, user_b: Uuid) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
