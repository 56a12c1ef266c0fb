mod auth;
mod conversation;
mod db;
mod error;
mod message;
mod middleware;
mod notification;
mod routes;
mod state;
mod user;
mod websocket;

use std::sync::Arc;

use conversation::{ConversationRepository, ConversationService};
use db::{create_pool, run_migrations};
use message::{MessageRepository, MessageService};
use notification::{
    start_notification_service, FcmPush, NotificationRepository, Notifier, PushProvider,
};
use routes::create_router;
use state::{AppState, Config};
use user::UserRepository;
use websocket::ConnectionManager;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chat_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    tracing::info!("Connecting to database...");
    let db = create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    run_migrations(&db).await?;

    // WebSocket session registry, shared by the handler and the notifier
    let ws_connections = ConnectionManager::new();

    // Repositories
    let user_repository = UserRepository::new(db.clone());
    let conversation_repository = ConversationRepository::new(db.clone());
    let message_repository = MessageRepository::new(db.clone());
    let notification_repository = NotificationRepository::new(db.clone());

    // Notification fan-out over websocket, durable records and FCM
    let push_provider: Arc<dyn PushProvider> =
        Arc::new(FcmPush::new(config.fcm_api_key.clone()));
    let notifier = Notifier::new(
        ws_connections.clone(),
        push_provider,
        notification_repository.clone(),
        user_repository.clone(),
    );

    // Services
    let conversation_service = ConversationService::new(conversation_repository.clone());
    let message_service = MessageService::new(
        message_repository.clone(),
        conversation_service.clone(),
        user_repository.clone(),
        notifier,
    );

    // Application state
    let state = AppState {
        config: config.clone(),
        ws_connections,
        user_repository,
        notification_repository,
        conversation_service,
        message_service,
    };

    // Start the notification retention sweep
    let cleanup_repo = state.notification_repository.clone();
    tokio::spawn(async move {
        if let Err(e) = start_notification_service(cleanup_repo).await {
            tracing::error!("Notification service error: {:?}", e);
        }
    });

    // Create router
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
