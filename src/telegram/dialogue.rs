//! Per-user registration sessions
//!
//! A session exists only while a user is in the middle of registering.
//! No session means either "never started" or "done"; the team store is
//! the source of truth for the latter.

use dashmap::DashMap;

use crate::telegram::keyboards::CONFIRM_YES_BUTTON;

/// Where a user is in the registration conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the user to type their full name
    AwaitingName,
    /// Name accepted, waiting for the user to confirm it
    AwaitingConfirmation { full_name: String },
}

/// Answer to the "is this name correct?" question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
}

impl Confirmation {
    /// Anything other than an explicit yes sends the user back to name entry.
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        if text == CONFIRM_YES_BUTTON {
            return Confirmation::Yes;
        }
        match text.to_lowercase().as_str() {
            "да" | "yes" | "y" => Confirmation::Yes,
            _ => Confirmation::No,
        }
    }
}

/// In-memory session table keyed by Telegram user ID
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<i64, SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: i64) -> Option<SessionState> {
        self.sessions.get(&user_id).map(|entry| entry.value().clone())
    }

    pub fn set(&self, user_id: i64, state: SessionState) {
        self.sessions.insert(user_id, state);
    }

    /// Ends the session; returns the state it was in, if any
    pub fn clear(&self, user_id: i64) -> Option<SessionState> {
        self.sessions.remove(&user_id).map(|(_, state)| state)
    }

    /// Number of users currently mid-registration
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
