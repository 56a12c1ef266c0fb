use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, Result},
    middleware::AuthUser,
    state::AppState,
    user::user_dto::{RegisterDeviceTokenRequest, RemoveDeviceTokenRequest},
    user::user_models::UserResponse,
};

/// Minimal profile lookup
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>> {
    let user = state
        .user_repository
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}

/// Register a mobile push token for the authenticated user
#[utoipa::path(
    put,
    path = "/api/users/me/push-token",
    request_body = RegisterDeviceTokenRequest,
    responses(
        (status = 204, description = "Token registered"),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn register_push_token(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<RegisterDeviceTokenRequest>,
) -> Result<StatusCode> {
    payload.validate()?;

    let platform = payload.platform.as_deref().unwrap_or("android");
    state
        .user_repository
        .register_device_token(user_id, payload.token.trim(), platform)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove a previously registered push token
#[utoipa::path(
    delete,
    path = "/api/users/me/push-token",
    request_body = RemoveDeviceTokenRequest,
    responses(
        (status = 204, description = "Token removed"),
        (status = 404, description = "Token not registered"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn unregister_push_token(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<RemoveDeviceTokenRequest>,
) -> Result<StatusCode> {
    payload.validate()?;

    let removed = state
        .user_repository
        .unregister_device_token(user_id, payload.token.trim())
        .await?;

    if removed == 0 {
        return Err(AppError::NotFound("Token not registered".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
