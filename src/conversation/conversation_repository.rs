use sqlx::PgPool;
use uuid::Uuid;

use crate::conversation::conversation_dto::ConversationListRow;
use crate::conversation::conversation_models::{Conversation, ConversationStatus};
use crate::error::Result;

#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>> {
        let conversation = sqlx::query_as::<_, Conversation>(
            "SELECT * FROM conversations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    /// Looks up the conversation between two users regardless of which of
    /// them initiated it.
    pub async fn find_by_pair(&self, user_a: Uuid, user_b: Uuid) -> Result<Option<Conversation>> {
        let conversation = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT * FROM conversations
            WHERE (initiator_id = $1 AND recipient_id = $2)
               OR (initiator_id = $2 AND recipient_id = $1)
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    /// Inserts a fresh pending conversation. Returns `None` when the unique
    /// pair index reports the conversation already exists, in which case the
    /// caller re-reads the surviving row.
    pub async fn insert_pending(
        &self,
        initiator_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<Option<Conversation>> {
        let conversation = sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (initiator_id, recipient_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            RETURNING *
            "#,
        )
        .bind(initiator_id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    /// Applies a status change only while the conversation is still pending.
    /// Returns `None` when the row is missing or was already settled.
    pub async fn set_status_if_pending(
        &self,
        id: Uuid,
        status: ConversationStatus,
    ) -> Result<Option<Conversation>> {
        let conversation = sqlx::query_as::<_, Conversation>(
            r#"
            UPDATE conversations
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    pub async fn set_last_message(&self, id: Uuid, message_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE conversations
            SET last_message_id = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(message_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// One page of a user's conversations, newest activity first. The peer
    /// profile and last message are joined in; conversations without a last
    /// message (all messages deleted) drop out of the overview.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ConversationListRow>> {
        let rows = sqlx::query_as::<_, ConversationListRow>(
            r#"
            SELECT c.id, c.initiator_id, c.status, c.created_at, c.updated_at,
                   u.id AS peer_id,
                   u.username AS peer_username,
                   u.avatar_url AS peer_avatar_url,
                   m.id AS last_message_id,
                   m.sender_id AS last_message_sender_id,
                   m.body AS last_message_body,
                   m.attachments AS last_message_attachments,
                   m.status AS last_message_status,
                   m.created_at AS last_message_created_at
            FROM conversations c
            INNER JOIN users u
                ON u.id = CASE WHEN c.initiator_id = $1 THEN c.recipient_id ELSE c.initiator_id END
            INNER JOIN messages m ON m.id = c.last_message_id
            WHERE (c.initiator_id = $1 OR c.recipient_id = $1)
              AND ($2::TEXT IS NULL OR u.username ILIKE '%' || $2 || '%')
            ORDER BY m.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(search)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn count_for_user(&self, user_id: Uuid, search: Option<&str>) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM conversations c
            INNER JOIN users u
                ON u.id = CASE WHEN c.initiator_id = $1 THEN c.recipient_id ELSE c.initiator_id END
            INNER JOIN messages m ON m.id = c.last_message_id
            WHERE (c.initiator_id = $1 OR c.recipient_id = $1)
              AND ($2::TEXT IS NULL OR u.username ILIKE '%' || $2 || '%')
            "#,
        )
        .bind(user_id)
        .bind(search)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
