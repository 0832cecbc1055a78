//! Reply keyboards and their button labels

use teloxide::types::{KeyboardButton, KeyboardMarkup};

pub const FIND_TEAM_BUTTON: &str = "🎯 Узнать свою команду";
pub const STATS_BUTTON: &str = "📊 Статистика";
pub const CONFIRM_YES_BUTTON: &str = "✅ Да, всё верно";
pub const CONFIRM_NO_BUTTON: &str = "❌ Нет, исправить";

/// The two buttons that stay at the bottom of the chat
pub fn main_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(FIND_TEAM_BUTTON),
        KeyboardButton::new(STATS_BUTTON),
    ]])
    .resize_keyboard()
    .persistent()
}

/// Yes/no buttons shown under the name confirmation
pub fn confirm_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(CONFIRM_YES_BUTTON)],
        vec![KeyboardButton::new(CONFIRM_NO_BUTTON)],
    ])
    .resize_keyboard()
    .one_time_keyboard()
}
