//! Chat transport
//!
//! The bot core only emits text, prompts and in-place edits; this module owns
//! how they reach the user. [`TelegramClient`] is the production transport.

mod error;
mod telegram;
mod transport;

pub use error::TransportError;
pub use telegram::{CallbackQuery, Chat, Message, TelegramClient, Update, User};
#[cfg(test)]
pub use transport::mock;
pub use transport::{ChatId, ChatTransport, MessageId, PromptOption};
