//! Message dispatch
//!
//! Maps menu clicks and keyboard commands to messages and runs them
//! against a page session.

use tracing::debug;

use crate::config;
use crate::core::session::PageSession;
use crate::shared::error::{AppError, AppResult};
use crate::shared::events::Notification;
use crate::shared::types::Message;

/// Run one message against the session
pub async fn handle_message(session: &mut PageSession, message: Message) -> Notification {
    debug!(?message, "handling message");
    match message {
        Message::Translate { target_lang } => session.translate(target_lang.as_deref()).await,
        Message::Revert => session.revert(),
    }
}

/// Parse a JSON message (`{"action": "translate", "targetLang": "DE"}`) and
/// run it
pub async fn handle_json(session: &mut PageSession, raw: &str) -> AppResult<Notification> {
    let message: Message = serde_json::from_str(raw)
        .map_err(|e| AppError::Validation(format!("Invalid message: {}", e)))?;
    Ok(handle_message(session, message).await)
}

/// Message for a context-menu item id, `None` for ids we do not own
pub fn message_for_menu_item(id: &str) -> Option<Message> {
    if id == config::MENU_REVERT_ID {
        return Some(Message::Revert);
    }
    let code = id.strip_prefix(config::MENU_TRANSLATE_PREFIX)?;
    config::menu_language(code).map(|lang| Message::translate(lang.code))
}

/// Message for a keyboard command. The translate shortcut uses the
/// configured target language.
pub fn message_for_shortcut(command: &str) -> Option<Message> {
    match command {
        config::SHORTCUT_TRANSLATE => Some(Message::Translate { target_lang: None }),
        config::SHORTCUT_REVERT => Some(Message::Revert),
        _ => None,
    }
}
