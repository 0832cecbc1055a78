//! Telegram bot handler tree configuration
//!
//! The same schema is used by the production dispatcher and can be fed
//! updates in tests.

mod schema;
mod types;

pub use schema::{schema, send_reply};
pub use types::{sender_id, HandlerDeps, HandlerError};
