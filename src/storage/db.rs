use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::core::config;
use crate::core::error::AppResult;
use crate::storage::migrations::run_migrations;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Every pooled connection waits up to `database::BUSY_TIMEOUT_SECS` for
/// SQLite's write lock and uses WAL journaling, so readers see a
/// consistent snapshot while a registration is being written.
/// The schema is created (or brought up to date) on the first connection.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
///
/// # Example
///
/// ```no_run
/// use team_distributor::storage::create_pool;
///
/// let pool = create_pool("teams.db")?;
/// # Ok::<(), team_distributor::core::error::AppError>(())
/// ```
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.busy_timeout(config::database::busy_timeout())?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        Ok(())
    });
    let pool = Pool::builder().max_size(config::database::POOL_SIZE).build(manager)?;

    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;

    log::info!("Database ready at {}", database_path);
    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}
