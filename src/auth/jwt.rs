use crate::error::{AppError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub exp: i64,
}

/// Issues a token for the given user. Token issuance normally lives with the
/// identity provider sharing our secret; this is used by tooling and tests.
pub fn create_jwt(user_id: Uuid, email: &str, secret: &str, expiration_hours: i64) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(expiration_hours))
        .ok_or(AppError::InternalError)?
        .timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AppError::Unauthorized("Failed to create token".to_string()))
}

/// Verify JWT token and extract claims
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_round_trip() {
        let user_id = Uuid::new_v4();
        let secret = "test-secret";

        let token = create_jwt(user_id, "ada@example.com", secret, 24).unwrap();
        let claims = verify_jwt(&token, secret).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "ada@example.com");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_jwt_rejects_wrong_secret() {
        let token = create_jwt(Uuid::new_v4(), "ada@example.com", "secret-a", 24).unwrap();
        assert!(verify_jwt(&token, "secret-b").is_err());
    }

    #[test]
    fn test_jwt_rejects_garbage() {
        assert!(verify_jwt("not-a-token", "secret").is_err());
    }
}
