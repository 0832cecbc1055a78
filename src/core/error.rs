use thiserror::Error;

/// Centralized error types for the application
///
/// All errors in the application are converted to this enum for consistent error handling.
/// Uses `thiserror` for automatic error conversion and display formatting.
///
/// # Example
///
/// ```no_run
/// use team_distributor::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Schema migration errors
    #[error("Migration error: {0}")]
    Migration(#[from] refinery::Error),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input that should never reach storage
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    /// Whether the error came from the storage layer
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            AppError::Database(_) | AppError::DatabasePool(_) | AppError::Migration(_)
        )
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_classification() {
        let err = AppError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(err.is_storage());
        assert!(err.to_string().starts_with("Database error"));

        let err = AppError::Validation("empty name".to_string());
        assert!(!err.is_storage());
        assert_eq!(err.to_string(), "Validation error: empty name");
    }
}
