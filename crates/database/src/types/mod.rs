//! Shared types for the database crate.

pub mod errors;

pub use errors::{DatabaseError, DatabaseResult};
