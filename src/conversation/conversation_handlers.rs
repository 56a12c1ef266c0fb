use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::conversation::conversation_dto::ConversationEntry;
use crate::conversation::conversation_models::Conversation;
use crate::error::Result;
use crate::message::message_dto::{ListConversationsQuery, PaginatedResponse};
use crate::middleware::AuthUser;
use crate::state::AppState;

/// List the caller's conversations, newest activity first.
#[utoipa::path(
    get,
    path = "/api/conversations",
    params(ListConversationsQuery),
    responses(
        (status = 200, description = "One page of the caller's conversations with peer and last message"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "conversations"
)]
pub async fn list_conversations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListConversationsQuery>,
) -> Result<Json<PaginatedResponse<ConversationEntry>>> {
    let page = state
        .message_service
        .list_conversations(user_id, query.search.as_deref(), query.page, query.limit)
        .await?;

    Ok(Json(page))
}

/// Accept a pending conversation request. Recipient only; re-accepting an
/// accepted conversation is a no-op.
#[utoipa::path(
    patch,
    path = "/api/conversations/{id}/accept",
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Conversation accepted", body = Conversation),
        (status = 403, description = "Caller is not the recipient, or the conversation was rejected"),
        (status = 404, description = "Conversation not found")
    ),
    security(("bearer_auth" = [])),
    tag = "conversations"
)]
pub async fn accept_conversation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Conversation>> {
    let conversation = state.conversation_service.accept(id, user_id).await?;
    Ok(Json(conversation))
}

/// Reject a pending conversation request. Recipient only; rejection is final
/// and sends from either side fail afterwards.
#[utoipa::path(
    patch,
    path = "/api/conversations/{id}/reject",
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Conversation rejected", body = Conversation),
        (status = 403, description = "Caller is not the recipient, or the conversation is no longer pending"),
        (status = 404, description = "Conversation not found")
    ),
    security(("bearer_auth" = [])),
    tag = "conversations"
)]
pub async fn reject_conversation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Conversation>> {
    let conversation = state.conversation_service.reject(id, user_id).await?;
    Ok(Json(conversation))
}

/// Mark every message addressed to the caller in this conversation as read.
#[utoipa::path(
    patch,
    path = "/api/conversations/{id}/read",
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Number of messages marked read"),
        (status = 400, description = "Conversation or user does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "conversations"
)]
pub async fn mark_conversation_read(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let updated = state
        .message_service
        .mark_conversation_read(id, user_id)
        .await?;

    Ok(Json(json!({ "updated": updated })))
}
