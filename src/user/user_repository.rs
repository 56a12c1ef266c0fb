use crate::error::Result;
use sqlx::PgPool;
use uuid::Uuid;
use super::user_models::User;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// All push tokens registered for a user, oldest first.
    pub async fn find_push_tokens(&self, user_id: Uuid) -> Result<Vec<String>> {
        let tokens: Vec<String> = sqlx::query_scalar(
            "SELECT token FROM device_tokens WHERE user_id = $1 ORDER BY created_at"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens)
    }

    pub async fn register_device_token(
        &self,
        user_id: Uuid,
        token: &str,
        platform: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO device_tokens (user_id, token, platform)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, token) DO UPDATE SET platform = EXCLUDED.platform"
        )
        .bind(user_id)
        .bind(token)
        .bind(platform)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn unregister_device_token(&self, user_id: Uuid, token: &str) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM device_tokens WHERE user_id = $1 AND token = $2"
        )
        .bind(user_id)
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
