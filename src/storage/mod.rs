//! Database pool, schema migrations, and the team store

pub mod db;
pub mod migrations;
pub mod teams;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use teams::{EmptyTeams, Registration, TeamStats, TeamStore, TeamStoreConfig};
