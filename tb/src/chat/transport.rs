//! Transport trait consumed by the bot handler

use async_trait::async_trait;

use super::TransportError;

pub type ChatId = i64;
pub type MessageId = i64;

/// One interactive choice in a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOption {
    pub label: String,
    /// Addressing token returned verbatim when the option is clicked
    pub token: String,
}

impl PromptOption {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

/// Outbound side of a chat platform
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send plain text, returning the new message id
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<MessageId, TransportError>;

    /// Send text with one button per option
    async fn send_prompt(&self, chat: ChatId, text: &str, options: &[PromptOption])
    -> Result<MessageId, TransportError>;

    /// Replace the text of an earlier message, dropping its buttons
    async fn edit_text(&self, chat: ChatId, message: MessageId, text: &str) -> Result<(), TransportError>;

    /// Stop the client-side spinner for a click
    async fn answer_callback(&self, callback_id: &str) -> Result<(), TransportError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Something the handler emitted
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Sent {
        Text { chat: ChatId, text: String },
        Prompt { chat: ChatId, text: String, options: Vec<PromptOption> },
        Edit { chat: ChatId, message: MessageId, text: String },
        Answer { callback_id: String },
    }

    /// Records everything sent through it
    pub struct MockTransport {
        sent: Mutex<Vec<Sent>>,
        next_id: AtomicI64,
    }

    impl Default for MockTransport {
        fn default() -> Self {
            Self {
                sent: Mutex::new(vec![]),
                next_id: AtomicI64::new(100),
            }
        }
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }

        /// Text of the most recent send or edit
        pub fn last_text(&self) -> Option<String> {
            self.sent().into_iter().rev().find_map(|s| match s {
                Sent::Text { text, .. } | Sent::Prompt { text, .. } | Sent::Edit { text, .. } => Some(text),
                Sent::Answer { .. } => None,
            })
        }

        fn record(&self, sent: Sent) -> MessageId {
            self.sent.lock().unwrap().push(sent);
            self.next_id.fetch_add(1, Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatTransport for MockTransport {
        async fn send_text(&self, chat: ChatId, text: &str) -> Result<MessageId, TransportError> {
            Ok(self.record(Sent::Text {
                chat,
                text: text.to_string(),
            }))
        }

        async fn send_prompt(
            &self,
            chat: ChatId,
            text: &str,
            options: &[PromptOption],
        ) -> Result<MessageId, TransportError> {
            Ok(self.record(Sent::Prompt {
                chat,
                text: text.to_string(),
                options: options.to_vec(),
            }))
        }

        async fn edit_text(&self, chat: ChatId, message: MessageId, text: &str) -> Result<(), TransportError> {
            self.record(Sent::Edit {
                chat,
                message,
                text: text.to_string(),
            });
            Ok(())
        }

        async fn answer_callback(&self, callback_id: &str) -> Result<(), TransportError> {
            self.record(Sent::Answer {
                callback_id: callback_id.to_string(),
            });
            Ok(())
        }
    }
}
