//! Team distributor - Telegram bot that registers participants and
//! spreads them evenly across a fixed number of teams
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, name validation, keep-alive web server
//! - `storage`: SQLite pool, migrations and the team store
//! - `telegram`: bot setup, registration flow and handler tree

pub mod cli;
pub mod core;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult, Settings};
pub use storage::{create_pool, get_connection, DbConnection, DbPool, TeamStore, TeamStoreConfig};
pub use telegram::{schema, HandlerDeps, RegistrationFlow};
