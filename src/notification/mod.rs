pub mod notification_handlers;
pub mod notification_models;
pub mod notification_repository;
pub mod notification_service;
pub mod notifier;
pub mod push;

pub use notification_repository::NotificationRepository;
pub use notification_service::start_notification_service;
pub use notifier::Notifier;
pub use push::{FcmPush, PushProvider};
