use std::sync::Arc;

use crate::conversation::ConversationService;
use crate::message::MessageService;
use crate::notification::NotificationRepository;
use crate::user::UserRepository;
use crate::websocket::ConnectionManager;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ws_connections: ConnectionManager,
    pub user_repository: UserRepository,
    pub notification_repository: NotificationRepository,
    pub conversation_service: ConversationService,
    pub message_service: MessageService,
}

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub fcm_api_key: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a number"),
            jwt_secret: std::env::var("JWT_SECRET")
                .expect("JWT_SECRET must be set"),
            fcm_api_key: std::env::var("FCM_API_KEY")
                .expect("FCM_API_KEY must be set"),
        }
    }
}
