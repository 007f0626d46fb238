//! User-facing reply copy

use crate::db::UserRecord;
use crate::validate::{ADDRESS_MAX_CHARS, AGE_MAX, AGE_MIN, NAME_MAX_CHARS};

pub(super) const GROUP_REJECTION: &str = "Please send me a direct message to use this bot. \
I don't work in group chats for privacy reasons.";

pub(super) const CANCELLED: &str = "No problem, I've cancelled the current process.\n\
Send /start whenever you want to try again.";

pub(super) const NOTHING_TO_CANCEL: &str =
    "There is nothing to cancel right now. Send /start to share your details.";

pub(super) const IDLE_HINT: &str =
    "Send /start to share your details, or /delete to erase what I have stored.";

pub(super) const DELETED: &str = "Your stored details have been deleted.\n\
You can provide them again anytime with /start.";

pub(super) const NOTHING_TO_DELETE: &str = "No stored data found for your account.\n\
You can provide your details with /start.";

pub(super) const SAVE_FAILED: &str =
    "Sorry, there was an error saving your data. Please try again later.";

pub(super) const DELETE_FAILED: &str =
    "Sorry, there was an error deleting your data. Please try again later.";

pub(super) const HELP: &str = "Available commands:\n\
/start - share your name, age and address\n\
/cancel - stop the current process\n\
/delete - erase your stored details\n\
/help - show this message";

pub(super) fn consent_and_name_prompt() -> String {
    "Hi! I can store your name, age, and address in my database \
to help with future interactions. By continuing, you agree \
that I will store these details until you delete them.\n\n\
You can reply /cancel anytime to stop.\n\n\
Let's get started. What's your full name?"
        .to_string()
}

pub(super) fn invalid_name() -> String {
    format!(
        "I couldn't read that name. Please enter your full name\n\
(1-{NAME_MAX_CHARS} characters, letters/numbers/spaces allowed)."
    )
}

pub(super) fn age_prompt(name: &str) -> String {
    format!(
        "Great, thanks {name}.\n\
How old are you? (Please enter a number between {AGE_MIN} and {AGE_MAX})"
    )
}

pub(super) fn age_not_a_number() -> String {
    format!(
        "That doesn't look like a valid age. Please enter a number\n\
between {AGE_MIN} and {AGE_MAX} (e.g., 27)."
    )
}

pub(super) fn age_out_of_range() -> String {
    format!(
        "Thanks! For this bot, the allowed age is between {AGE_MIN} and {AGE_MAX}.\n\
Please enter a number in that range."
    )
}

pub(super) fn address_prompt() -> String {
    format!(
        "Got it. What's your address?\n\
(Max {ADDRESS_MAX_CHARS} characters; you can include apartment/unit, etc.)"
    )
}

pub(super) fn invalid_address() -> String {
    format!(
        "Please enter a non-empty address up to {ADDRESS_MAX_CHARS} characters.\n\
For example: 123 Main St, Springfield, IL 62704"
    )
}

pub(super) fn saved(record: &UserRecord) -> String {
    format!(
        "All set! I've saved your details.\n\n\
Name: {}\n\
Age: {}\n\
Address: {}\n\n\
You can update these later by sending /start again,\n\
or erase them anytime with /delete.",
        record.name, record.age, record.address
    )
}

pub(super) fn unknown_command(command: &str) -> String {
    format!("I don't know the command {command}.\n\n{HELP}")
}
