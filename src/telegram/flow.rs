//! Registration flow: turns user actions into store calls and replies
//!
//! Nothing here touches the Telegram API. The handler tree maps updates to
//! an [`Action`], calls [`RegistrationFlow::handle`] and sends back the
//! returned [`Reply`] list, which keeps the whole conversation testable
//! without a bot.

use teloxide::utils::command::BotCommands;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::validation::validate_full_name;
use crate::storage::TeamStore;
use crate::telegram::bot::Command;
use crate::telegram::dialogue::{Confirmation, SessionState, SessionStore};
use crate::telegram::format;
use crate::telegram::keyboards::{FIND_TEAM_BUTTON, STATS_BUTTON};

/// Something a user asked the bot to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// `/start`
    Start,
    /// "Find my team" button
    FindMyTeam,
    /// Free text: a name or a confirmation, depending on the session
    Text(String),
    Cancel,
    ListTeams,
    ShowStats,
    /// Admin liveness check
    Restart,
    Help,
    /// A slash command the bot does not know
    UnknownCommand,
}

impl Action {
    /// Classifies a non-command text message.
    ///
    /// Menu buttons win over session handling, so pressing a button while
    /// the bot waits for a name never registers the button label as a name.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed {
            FIND_TEAM_BUTTON => Action::FindMyTeam,
            STATS_BUTTON => Action::ShowStats,
            _ if trimmed.starts_with('/') => Action::UnknownCommand,
            _ => Action::Text(trimmed.to_string()),
        }
    }
}

impl From<Command> for Action {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::Start => Action::Start,
            Command::List => Action::ListTeams,
            Command::Stats => Action::ShowStats,
            Command::Cancel => Action::Cancel,
            Command::Help => Action::Help,
            Command::Restart => Action::Restart,
        }
    }
}

/// Keyboard to attach to an outgoing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKeyboard {
    Main,
    Confirm,
    /// Leave whatever keyboard the user currently has
    Unchanged,
}

/// One outgoing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: ReplyKeyboard,
}

impl Reply {
    pub fn main(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: ReplyKeyboard::Main,
        }
    }

    pub fn confirm(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: ReplyKeyboard::Confirm,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: ReplyKeyboard::Unchanged,
        }
    }
}

/// Reply for an action that failed with `err`.
///
/// Storage trouble is usually transient, so the user is asked to retry;
/// anything else sends them back to `/start`.
pub fn failure_reply(err: &AppError) -> Reply {
    if err.is_storage() {
        Reply::main(format::storage_failure())
    } else {
        Reply::main(format::unexpected_failure())
    }
}

/// The command dispatcher state: store, sessions and the admin allow-list
pub struct RegistrationFlow {
    store: TeamStore,
    sessions: SessionStore,
    admin_ids: Vec<i64>,
    max_chunk_chars: usize,
}

impl RegistrationFlow {
    pub fn new(store: TeamStore, admin_ids: Vec<i64>) -> Self {
        Self {
            store,
            sessions: SessionStore::new(),
            admin_ids,
            max_chunk_chars: config::messages::MAX_CHUNK_CHARS,
        }
    }

    pub fn with_max_chunk_chars(mut self, max_chunk_chars: usize) -> Self {
        self.max_chunk_chars = max_chunk_chars;
        self
    }

    pub fn store(&self) -> &TeamStore {
        &self.store
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// Handles one action from `user_id` and returns the replies to send.
    ///
    /// # Errors
    ///
    /// Storage errors are returned as-is; the session is left unchanged so
    /// the user can simply repeat the last step.
    pub fn handle(&self, user_id: i64, action: Action) -> AppResult<Vec<Reply>> {
        match action {
            Action::Start => self.start(user_id, true),
            Action::FindMyTeam => self.start(user_id, false),
            Action::Text(text) => self.text(user_id, &text),
            Action::Cancel => {
                if self.sessions.clear(user_id).is_some() {
                    log::info!("User {} cancelled registration", user_id);
                }
                Ok(vec![Reply::main(format::cancelled())])
            }
            Action::ListTeams => self.list_teams(),
            Action::ShowStats => self.show_stats(),
            Action::Restart => self.restart(user_id),
            Action::Help => Ok(vec![Reply::main(Command::descriptions().to_string())]),
            Action::UnknownCommand => Ok(vec![Reply::plain(format::unknown_command(
                &Command::descriptions().to_string(),
            ))]),
        }
    }

    fn start(&self, user_id: i64, greeting: bool) -> AppResult<Vec<Reply>> {
        if let Some(registration) = self.store.lookup(user_id)? {
            self.sessions.clear(user_id);
            let text = if greeting {
                format::welcome_back(&registration.full_name, registration.team_number)
            } else {
                format::your_team(&registration.full_name, registration.team_number)
            };
            return Ok(vec![Reply::main(text)]);
        }

        self.sessions.set(user_id, SessionState::AwaitingName);
        let text = if greeting {
            format::welcome_new_user()
        } else {
            format::ask_name()
        };
        Ok(vec![Reply::main(text)])
    }

    fn text(&self, user_id: i64, text: &str) -> AppResult<Vec<Reply>> {
        match self.sessions.get(user_id) {
            Some(SessionState::AwaitingName) => match validate_full_name(text) {
                Ok(full_name) => {
                    let reply = Reply::confirm(format::confirm_name(&full_name));
                    self.sessions
                        .set(user_id, SessionState::AwaitingConfirmation { full_name });
                    Ok(vec![reply])
                }
                Err(e) => {
                    log::debug!("User {} sent an invalid name: {}", user_id, e);
                    Ok(vec![Reply::plain(format::invalid_name())])
                }
            },
            Some(SessionState::AwaitingConfirmation { full_name }) => match Confirmation::from_text(text) {
                Confirmation::Yes => {
                    let team_number = self.store.assign(user_id, &full_name)?;
                    self.sessions.clear(user_id);
                    Ok(vec![Reply::main(format::registered(&full_name, team_number))])
                }
                Confirmation::No => {
                    self.sessions.set(user_id, SessionState::AwaitingName);
                    Ok(vec![Reply::main(format::ask_name_again())])
                }
            },
            None => match self.store.lookup(user_id)? {
                Some(registration) => Ok(vec![Reply::main(format::your_team(
                    &registration.full_name,
                    registration.team_number,
                ))]),
                None => Ok(vec![Reply::main(format::not_registered_hint())]),
            },
        }
    }

    fn list_teams(&self) -> AppResult<Vec<Reply>> {
        let rosters = self.store.rosters()?;
        let Some(text) = format::format_rosters(&rosters) else {
            return Ok(vec![Reply::main(format::empty_rosters())]);
        };

        Ok(format::split_message(&text, self.max_chunk_chars)
            .into_iter()
            .map(Reply::main)
            .collect())
    }

    fn show_stats(&self) -> AppResult<Vec<Reply>> {
        let stats = self.store.stats()?;
        let text = format::format_stats(&stats).unwrap_or_else(format::empty_stats);
        Ok(vec![Reply::main(text)])
    }

    fn restart(&self, user_id: i64) -> AppResult<Vec<Reply>> {
        if !self.is_admin(user_id) {
            log::warn!("User {} tried an admin command", user_id);
            return Ok(vec![Reply::main(format::admin_only())]);
        }
        let total = self.store.total_count()?;
        Ok(vec![Reply::main(format::bot_alive(total))])
    }
}
