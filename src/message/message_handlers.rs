use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    error::Result,
    message::{
        message_dto::{
            ListMessagesQuery, PaginatedResponse, SendMessageRequest, UpdateMessageRequest,
        },
        message_models::{Message, MessageResponse},
    },
    middleware::AuthUser,
    state::AppState,
};

/// Send a message to another user
#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = MessageResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Conversation was rejected"),
        (status = 404, description = "Recipient not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse> {
    let message = state.message_service.send_message(user_id, payload).await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// List messages by conversation or by peer user
#[utoipa::path(
    get,
    path = "/api/messages",
    tag = "messages",
    params(ListMessagesQuery),
    responses(
        (status = 200, description = "One page of messages, newest first"),
        (status = 400, description = "Neither conversation_id nor with_user supplied"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<PaginatedResponse<Message>>> {
    let page = state.message_service.list_messages(user_id, query).await?;

    Ok(Json(page))
}

/// Edit a message's body or status
#[utoipa::path(
    patch,
    path = "/api/messages/{id}",
    tag = "messages",
    params(("id" = Uuid, Path, description = "Message id")),
    request_body = UpdateMessageRequest,
    responses(
        (status = 200, description = "Updated message", body = Message),
        (status = 403, description = "Caller may not edit this message"),
        (status = 404, description = "Message not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(message_id): Path<Uuid>,
    Json(payload): Json<UpdateMessageRequest>,
) -> Result<Json<Message>> {
    let message = state
        .message_service
        .update_message(user_id, message_id, payload)
        .await?;

    Ok(Json(message))
}

/// Delete a message. Responds with the removed row.
#[utoipa::path(
    delete,
    path = "/api/messages/{id}",
    tag = "messages",
    params(("id" = Uuid, Path, description = "Message id")),
    responses(
        (status = 200, description = "Deleted message", body = Message),
        (status = 403, description = "Caller is not the sender"),
        (status = 404, description = "Message not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(message_id): Path<Uuid>,
) -> Result<Json<Message>> {
    let message = state
        .message_service
        .delete_message(user_id, message_id)
        .await?;

    Ok(Json(message))
}
