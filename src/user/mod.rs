pub mod user_models;
pub mod user_dto;
pub mod user_repository;
pub mod user_handlers;

pub use user_repository::UserRepository;
