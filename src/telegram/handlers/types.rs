//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::Message;

use crate::telegram::flow::RegistrationFlow;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub flow: Arc<RegistrationFlow>,
}

impl HandlerDeps {
    pub fn new(flow: Arc<RegistrationFlow>) -> Self {
        Self { flow }
    }
}

/// Telegram user ID of the message author, if there is one
pub fn sender_id(msg: &Message) -> Option<i64> {
    msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok())
}
