//! Domain entities persisted by this crate.

pub mod chat;
pub mod message;

pub use chat::{Chat, LatestMessage};
pub use message::{CreateMessageRequest, Message, MessageContent, SeenMessage};
