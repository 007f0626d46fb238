//! Mapping Telegram messages to conversation events

use crate::runtime::{ChatRef, Inbound};
use crate::state_machine::{Event, UserId};
use teloxide::types::Message;

/// Interpret message text as a command or a free-text answer.
///
/// Commands may carry a `@botname` suffix; commands addressed to another bot
/// yield `None`. Outside private chats only `/start` is passed on, so the
/// user can be told to message the bot directly.
pub fn parse_text(text: &str, chat_is_private: bool, bot_username: Option<&str>) -> Option<Event> {
    let event = match text.trim_start().strip_prefix('/') {
        Some(rest) if rest.starts_with(|c: char| c.is_alphanumeric() || c == '_') => {
            let word = rest.split_whitespace().next().unwrap_or_default();
            let (command, target) = match word.split_once('@') {
                Some((command, target)) => (command, Some(target)),
                None => (word, None),
            };
            if let (Some(target), Some(ours)) = (target, bot_username) {
                if !target.eq_ignore_ascii_case(ours) {
                    return None;
                }
            }
            command_event(command, chat_is_private)
        }
        _ => Event::text(text),
    };

    if chat_is_private || matches!(event, Event::Start { .. }) {
        Some(event)
    } else {
        None
    }
}

fn command_event(command: &str, chat_is_private: bool) -> Event {
    match command.to_ascii_lowercase().as_str() {
        "start" => Event::Start { chat_is_private },
        "cancel" => Event::Cancel,
        "delete" => Event::Delete,
        "help" => Event::Help,
        _ => Event::UnknownCommand {
            command: format!("/{command}"),
        },
    }
}

/// Build the inbound event for a Telegram message, if it is one we handle.
///
/// Messages without a sender or without text are ignored.
pub fn to_inbound(msg: &Message, bot_username: Option<&str>) -> Option<Inbound> {
    let user = msg.from.as_ref()?;
    let user_id = UserId(i64::try_from(user.id.0).ok()?);
    let text = msg.text()?;
    let chat = ChatRef {
        id: msg.chat.id.0,
        is_private: msg.chat.is_private(),
    };

    let event = parse_text(text, chat.is_private, bot_username)?;
    Some(Inbound {
        user_id,
        chat,
        event,
    })
}
