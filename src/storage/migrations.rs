use rusqlite::Connection;
use std::sync::{Mutex, OnceLock};

use crate::core::config;
use crate::core::error::AppResult;

mod embedded {
    use refinery::embed_migrations;

    embed_migrations!("./migrations");
}

static MIGRATION_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Applies the embedded schema migrations.
///
/// Refinery wraps every migration in its own transaction, so the outer
/// protection here is a per-process lock plus SQLite's busy timeout for
/// other processes sharing the same file.
pub fn run_migrations(conn: &mut Connection) -> AppResult<()> {
    let mutex = MIGRATION_LOCK.get_or_init(|| Mutex::new(()));
    // Migrations are idempotent, so a lock poisoned by a panicking thread is still usable
    let _guard = match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Migration lock was poisoned, recovering...");
            poisoned.into_inner()
        }
    };

    conn.busy_timeout(config::database::busy_timeout())?;

    let report = embedded::migrations::runner().run(conn)?;
    for migration in report.applied_migrations() {
        log::info!("Applied migration V{}__{}", migration.version(), migration.name());
    }

    Ok(())
}
