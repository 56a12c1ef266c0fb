use crate::{
    conversation::conversation_dto::{ConversationEntry, LastMessagePreview, PeerProfile},
    conversation::conversation_handlers,
    conversation::conversation_models::{Conversation, ConversationStatus},
    message::message_dto::{AttachmentInput, SendMessageRequest, UpdateMessageRequest},
    message::message_handlers,
    message::message_models::{Attachment, Message, MessageResponse, MessageStatus},
    middleware::auth_middleware,
    notification::notification_handlers,
    notification::notification_models::{Notification, NotificationType},
    state::AppState,
    user::user_dto::{RegisterDeviceTokenRequest, RemoveDeviceTokenRequest},
    user::user_handlers,
    user::user_models::{User, UserResponse},
    websocket::ws_handler,
};
use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        message_handlers::send_message,
        message_handlers::list_messages,
        message_handlers::update_message,
        message_handlers::delete_message,
        conversation_handlers::list_conversations,
        conversation_handlers::accept_conversation,
        conversation_handlers::reject_conversation,
        conversation_handlers::mark_conversation_read,
        notification_handlers::get_notifications,
        notification_handlers::mark_notification_read,
        notification_handlers::delete_notification,
        user_handlers::get_user,
        user_handlers::register_push_token,
        user_handlers::unregister_push_token,
    ),
    components(
        schemas(
            SendMessageRequest,
            UpdateMessageRequest,
            AttachmentInput,
            RegisterDeviceTokenRequest,
            RemoveDeviceTokenRequest,
            User,
            UserResponse,
            Message,
            MessageResponse,
            MessageStatus,
            Attachment,
            Conversation,
            ConversationStatus,
            ConversationEntry,
            PeerProfile,
            LastMessagePreview,
            Notification,
            NotificationType,
        )
    ),
    tags(
        (name = "messages", description = "Message sending and history endpoints"),
        (name = "conversations", description = "Conversation overview and lifecycle endpoints"),
        (name = "notifications", description = "Notification endpoints"),
        (name = "users", description = "User profile and device token endpoints")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            )
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let message_routes = Router::new()
        .route(
            "/",
            post(message_handlers::send_message).get(message_handlers::list_messages),
        )
        .route(
            "/:id",
            patch(message_handlers::update_message).delete(message_handlers::delete_message),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let conversation_routes = Router::new()
        .route("/", get(conversation_handlers::list_conversations))
        .route("/:id/read", patch(conversation_handlers::mark_conversation_read))
        .route("/:id/accept", patch(conversation_handlers::accept_conversation))
        .route("/:id/reject", patch(conversation_handlers::reject_conversation))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let notification_routes = Router::new()
        .route("/", get(notification_handlers::get_notifications))
        .route("/:id/read", patch(notification_handlers::mark_notification_read))
        .route("/:id", delete(notification_handlers::delete_notification))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let user_routes = Router::new()
        .route("/:id", get(user_handlers::get_user))
        .route(
            "/me/push-token",
            put(user_handlers::register_push_token)
                .delete(user_handlers::unregister_push_token),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let ws_route = Router::new().route("/", get(ws_handler)).route_layer(
        middleware::from_fn_with_state(state.clone(), auth_middleware),
    );

    let api_routes = Router::new()
        .nest("/messages", message_routes)
        .nest("/conversations", conversation_routes)
        .nest("/notifications", notification_routes)
        .nest("/users", user_routes)
        .nest("/ws", ws_route);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
