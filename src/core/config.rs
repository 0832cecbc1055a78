use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot
/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: teams.db
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "teams.db".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Custom Bot API server URL (local telegram-bot-api instance)
/// Read from BOT_API_URL environment variable
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| env::var("BOT_API_URL").ok().filter(|s| !s.is_empty()));

/// Team distribution configuration
pub mod teams {
    use once_cell::sync::Lazy;
    use std::env;

    /// Number of teams used when TEAM_COUNT is not set
    pub const DEFAULT_COUNT: u32 = 12;

    /// Upper bound for TEAM_COUNT; balancing keeps one counter per team
    pub const MAX_COUNT: u32 = 1000;

    /// Raw TEAM_COUNT value, if set
    pub static COUNT_RAW: Lazy<Option<String>> = Lazy::new(|| env::var("TEAM_COUNT").ok());

    /// Number of teams registrants are distributed into
    /// Read from TEAM_COUNT environment variable
    /// Must stay fixed once registrations exist
    pub static COUNT: Lazy<u32> = Lazy::new(|| {
        COUNT_RAW
            .as_deref()
            .and_then(|raw| parse_count(raw).ok())
            .unwrap_or(DEFAULT_COUNT)
    });

    /// Parses a team count, accepting only `1..=MAX_COUNT`.
    pub fn parse_count(raw: &str) -> Result<u32, String> {
        let count: u32 = raw
            .trim()
            .parse()
            .map_err(|_| format!("TEAM_COUNT must be a whole number, got {:?}", raw))?;
        if count == 0 || count > MAX_COUNT {
            return Err(format!("TEAM_COUNT must be between 1 and {}, got {}", MAX_COUNT, count));
        }
        Ok(count)
    }

    /// Whether listings and statistics include teams that have no members yet
    /// Read from SHOW_EMPTY_TEAMS environment variable
    /// Default: false
    pub static SHOW_EMPTY: Lazy<bool> = Lazy::new(|| {
        env::var("SHOW_EMPTY_TEAMS")
            .map(|v| super::parse_flag(&v))
            .unwrap_or(false)
    });
}

/// Admin configuration
pub mod admin {
    use once_cell::sync::Lazy;
    use std::env;

    pub(crate) fn parse_admin_ids(raw: &str) -> Vec<i64> {
        raw.split([',', ' ', '\n', '\t'])
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect()
    }

    /// Admin user IDs (comma-separated)
    /// Read from ADMIN_IDS environment variable
    pub static ADMIN_IDS: Lazy<Vec<i64>> = Lazy::new(|| {
        env::var("ADMIN_IDS")
            .ok()
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default()
    });
}

/// Keep-alive web server configuration
pub mod web {
    use once_cell::sync::Lazy;
    use std::env;

    /// Port for the status page and /health endpoint
    /// Read from WEB_PORT (or PORT, as set by most hosting platforms)
    /// Default: 8080
    pub static PORT: Lazy<u16> = Lazy::new(|| {
        env::var("WEB_PORT")
            .or_else(|_| env::var("PORT"))
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080)
    });

    /// Read from WEB_ENABLED environment variable
    /// Default: true
    pub static ENABLED: Lazy<bool> = Lazy::new(|| {
        env::var("WEB_ENABLED")
            .map(|v| super::parse_flag(&v))
            .unwrap_or(true)
    });
}

/// Database configuration
pub mod database {
    use super::Duration;

    /// Maximum number of pooled SQLite connections
    pub const POOL_SIZE: u32 = 8;

    /// How long a connection waits for SQLite's write lock (in seconds)
    pub const BUSY_TIMEOUT_SECS: u64 = 10;

    /// Busy timeout duration
    pub fn busy_timeout() -> Duration {
        Duration::from_secs(BUSY_TIMEOUT_SECS)
    }
}

/// Retry configuration
pub mod retry {
    use super::Duration;

    /// Maximum number of retries for dispatcher reconnection
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Delay between dispatcher retry attempts (in seconds)
    pub const DISPATCHER_RETRY_DELAY_SECS: u64 = 5;

    /// Dispatcher retry delay duration
    pub fn dispatcher_delay() -> Duration {
        Duration::from_secs(DISPATCHER_RETRY_DELAY_SECS)
    }

    /// Base for exponential backoff calculation
    pub const EXPONENTIAL_BACKOFF_BASE: u64 = 2;
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    /// Must exceed the long polling timeout
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Outgoing message limits
pub mod messages {
    /// Telegram rejects messages over 4096 characters; keep headroom
    pub const MAX_CHUNK_CHARS: usize = 4000;
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Snapshot of the settings the bot needs to run
#[derive(Debug, Clone)]
pub struct Settings {
    pub bot_token: String,
    pub database_path: String,
    pub team_count: u32,
    /// TEAM_COUNT as given, kept so a typo fails startup instead of falling back
    pub team_count_raw: Option<String>,
    pub show_empty_teams: bool,
    pub admin_ids: Vec<i64>,
    pub web_port: u16,
    pub web_enabled: bool,
}

impl Settings {
    /// Collects the environment-backed statics into one value
    pub fn from_env() -> Self {
        Self {
            bot_token: BOT_TOKEN.clone(),
            database_path: DATABASE_PATH.clone(),
            team_count: *teams::COUNT,
            team_count_raw: teams::COUNT_RAW.clone(),
            show_empty_teams: *teams::SHOW_EMPTY,
            admin_ids: admin::ADMIN_IDS.clone(),
            web_port: *web::PORT,
            web_enabled: *web::ENABLED,
        }
    }

    /// Fails on configuration the bot cannot start with
    pub fn validate(&self) -> Result<(), crate::core::error::AppError> {
        use crate::core::error::AppError;

        if self.bot_token.trim().is_empty() {
            return Err(AppError::Config(
                "BOT_TOKEN environment variable not set".to_string(),
            ));
        }
        self.validate_storage()
    }

    /// Checks what opening the team store needs; every subcommand runs this
    pub fn validate_storage(&self) -> Result<(), crate::core::error::AppError> {
        use crate::core::error::AppError;

        if let Some(raw) = &self.team_count_raw {
            teams::parse_count(raw).map_err(AppError::Config)?;
        }
        if self.team_count == 0 || self.team_count > teams::MAX_COUNT {
            return Err(AppError::Config(format!(
                "TEAM_COUNT must be between 1 and {}",
                teams::MAX_COUNT
            )));
        }
        if self.database_path.trim().is_empty() {
            return Err(AppError::Config("DATABASE_PATH must not be empty".to_string()));
        }
        Ok(())
    }
}
