//! Input validation for registration names
//!
//! Format rules live here, in front of the store: the store only refuses
//! empty names, everything else is checked before a name is ever confirmed.

use thiserror::Error;

/// Minimum length of a full name, in characters
pub const MIN_NAME_CHARS: usize = 5;

/// Minimum number of whitespace-separated words in a full name
pub const MIN_NAME_WORDS: usize = 2;

/// Validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name is empty")]
    Empty,

    #[error("name is shorter than {MIN_NAME_CHARS} characters")]
    TooShort,

    #[error("name needs at least {MIN_NAME_WORDS} words")]
    TooFewWords,
}

/// Validates a full name typed by a user and returns it normalized.
///
/// The minimum length applies to the trimmed input. The returned name has
/// inner runs of whitespace collapsed to single spaces.
///
/// # Examples
/// ```
/// use team_distributor::core::validation::validate_full_name;
///
/// assert_eq!(validate_full_name("  Иванов  Иван Иванович ").unwrap(), "Иванов Иван Иванович");
/// assert!(validate_full_name("Иван").is_err());
/// ```
pub fn validate_full_name(raw: &str) -> Result<String, ValidationError> {
    let words: Vec<&str> = raw.split_whitespace().collect();
    if words.is_empty() {
        return Err(ValidationError::Empty);
    }

    // Length counts the name as typed, inner whitespace included
    if raw.trim().chars().count() < MIN_NAME_CHARS {
        return Err(ValidationError::TooShort);
    }
    if words.len() < MIN_NAME_WORDS {
        return Err(ValidationError::TooFewWords);
    }

    Ok(words.join(" "))
}
