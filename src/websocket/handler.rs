use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    message::message_dto::SendMessageRequest,
    middleware::AuthUser,
    state::AppState,
    websocket::types::{
        ClientMessage, ErrorPayload, NewMessagePayload, TypingIndicatorPayload, UserStatusPayload,
        WsMessage,
    },
};

use super::connection::WsSender;
use super::types::message_topic;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, user_id, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, user_id: Uuid, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

    state.ws_connections.add_connection(user_id, tx.clone());

    let online_status = WsMessage::UserStatus(UserStatusPayload {
        user_id,
        is_online: true,
    });
    state.ws_connections.broadcast(online_status);

    // Forward queued frames to the socket, interleaving protocol pings so
    // half-dead connections are torn down.
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        loop {
            tokio::select! {
                maybe_msg = rx.recv() => {
                    match maybe_msg {
                        Some(msg) => {
                            if let Ok(json) = serde_json::to_string(&msg) {
                                if sender.send(Message::Text(json)).await.is_err() {
                                    break;
                                }
                            }
                        }
                        None => break,
                    }
                }
                _ = heartbeat.tick() => {
                    if sender.send(Message::Ping(Vec::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    let state_clone = state.clone();
    let tx_clone = tx.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Text(text) = msg {
                if let Err(e) = process_client_message(&text, user_id, &state_clone, &tx_clone).await
                {
                    tracing::error!("Error processing WebSocket message: {:?}", e);
                    let error_msg = WsMessage::Error(ErrorPayload {
                        message: e.to_string(),
                    });
                    let _ = tx_clone.send(error_msg);
                }
            } else if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.ws_connections.remove_connection(&user_id);
    let offline_status = WsMessage::UserStatus(UserStatusPayload {
        user_id,
        is_online: false,
    });
    state.ws_connections.broadcast(offline_status);

    tracing::info!("WebSocket connection closed for user {}", user_id);
}

/// Process incoming client messages
async fn process_client_message(
    text: &str,
    user_id: Uuid,
    state: &AppState,
    tx: &WsSender,
) -> Result<()> {
    let client_msg: ClientMessage = serde_json::from_str(text)
        .map_err(|e| AppError::InvalidArgument(format!("Invalid message format: {}", e)))?;

    match client_msg {
        ClientMessage::SendMessage {
            recipient_id,
            body,
            attachments,
        } => {
            // Same path as the REST endpoint: resolve, persist, fan out.
            let message = state
                .message_service
                .send_message(
                    user_id,
                    SendMessageRequest {
                        recipient_id,
                        body,
                        attachments,
                    },
                )
                .await?;

            // Fan-out already notified the recipient; echo to the sender as
            // delivery confirmation.
            let topic = message_topic(message.conversation_id);
            let _ = tx.send(WsMessage::NewMessage(NewMessagePayload {
                topic,
                message,
            }));
        }
        ClientMessage::TypingIndicator {
            conversation_with,
            is_typing,
        } => {
            let typing_msg = WsMessage::TypingIndicator(TypingIndicatorPayload {
                user_id,
                is_typing,
                conversation_with,
            });
            state.ws_connections.send_to_user(&conversation_with, typing_msg);
        }
        ClientMessage::MarkRead { conversation_id } => {
            state
                .message_service
                .mark_conversation_read(conversation_id, user_id)
                .await?;
        }
        ClientMessage::Ping => {
            let _ = tx.send(WsMessage::Pong);
        }
    }

    Ok(())
}
