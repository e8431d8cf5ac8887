//! # Parley Chats Crate
//!
//! Business logic for conversations and messages: participant
//! authorization, direct and group chat creation, latest-message
//! denormalization, the seen-state transition, and cascade deletion with
//! media cleanup through the object-store collaborator seam.
//!
//! Real-time fan-out lives in `parley-presence`; this crate only decides
//! what is persisted and who is allowed to do it.

pub mod errors;
pub mod media;
pub mod services;

pub use errors::{ChatError, ChatResult};
pub use media::{LoggingMediaStore, MediaStore};
pub use services::{ChatService, ChatSummary, MessageService};
