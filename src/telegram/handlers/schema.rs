//! Dispatcher schema and handler chain builders

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{sender_id, HandlerDeps, HandlerError};
use crate::telegram::bot::Command;
use crate::telegram::flow::{failure_reply, Action, Reply, ReplyKeyboard};
use crate::telegram::keyboards::{confirm_keyboard, main_keyboard};

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Commands are matched first; every other text message (menu buttons,
/// names, confirmations) goes through the message handler.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(message_handler(deps_messages))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id);
                respond(&bot, &msg, &deps, Action::from(cmd)).await
            }
        },
    ))
}

fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let action = Action::from_text(msg.text().unwrap_or_default());
                respond(&bot, &msg, &deps, action).await
            }
        })
}

/// Runs the action through the registration flow and sends the replies.
///
/// Store access happens on the blocking pool since a write may wait on
/// SQLite's busy timeout.
async fn respond(bot: &Bot, msg: &Message, deps: &HandlerDeps, action: Action) -> Result<(), HandlerError> {
    let Some(user_id) = sender_id(msg) else {
        log::warn!("Ignoring message without a sender in chat {}", msg.chat.id);
        return Ok(());
    };

    let flow = Arc::clone(&deps.flow);
    let replies = match tokio::task::spawn_blocking(move || flow.handle(user_id, action)).await? {
        Ok(replies) => replies,
        Err(e) => {
            if e.is_storage() {
                log::error!("❌ Storage failure for user {}: {}", user_id, e);
            } else {
                log::warn!("Failed to handle update from user {}: {}", user_id, e);
            }
            vec![failure_reply(&e)]
        }
    };

    for reply in replies {
        send_reply(bot, msg.chat.id, reply).await?;
    }
    Ok(())
}

/// Sends one reply with the keyboard it asks for
pub async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> Result<(), teloxide::RequestError> {
    let request = bot.send_message(chat_id, reply.text);
    match reply.keyboard {
        ReplyKeyboard::Main => request.reply_markup(main_keyboard()).await?,
        ReplyKeyboard::Confirm => request.reply_markup(confirm_keyboard()).await?,
        ReplyKeyboard::Unchanged => request.await?,
    };
    Ok(())
}
