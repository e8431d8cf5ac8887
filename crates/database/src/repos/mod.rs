//! Data access repositories.

pub mod chat_repository;
pub mod message_repository;

pub use chat_repository::ChatRepository;
pub use message_repository::MessageRepository;
