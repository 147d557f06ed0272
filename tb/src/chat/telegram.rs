//! Telegram Bot API client
//!
//! Only the handful of methods the bot needs: `getUpdates` long polling,
//! `sendMessage` (with an inline keyboard for prompts), `editMessageText` and
//! `answerCallbackQuery`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{ChatId, ChatTransport, MessageId, PromptOption, TransportError};
use crate::config::TelegramConfig;

/// Extra time on top of the long-poll timeout before the HTTP request gives up
const POLL_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// The prompt the button belongs to; absent for very old messages
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: MessageId,
}

/// Telegram transport, safe for concurrent use
pub struct TelegramClient {
    api_url: String,
    http: Client,
    poll_timeout: Duration,
}

impl TelegramClient {
    /// Create a client from configuration, reading the token from the environment
    pub fn from_config(config: &TelegramConfig) -> Result<Self, TransportError> {
        debug!(token_env = %config.token_env, base_url = %config.base_url, "from_config: called");
        let token = config.token().map_err(|e| TransportError::Config(e.to_string()))?;
        Self::new(&config.base_url, token.trim(), Duration::from_secs(config.poll_timeout_secs))
    }

    pub fn new(base_url: &str, token: &str, poll_timeout: Duration) -> Result<Self, TransportError> {
        if token.is_empty() {
            return Err(TransportError::Config("empty bot token".to_string()));
        }
        let http = Client::builder()
            .timeout(poll_timeout + POLL_GRACE)
            .build()
            .map_err(TransportError::Network)?;

        Ok(Self {
            api_url: format!("{}/bot{}", base_url.trim_end_matches('/'), token),
            http,
            poll_timeout,
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: serde_json::Value) -> Result<T, TransportError> {
        debug!(%method, "call: sending request");
        let response = self
            .http
            .post(format!("{}/{}", self.api_url, method))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let parsed: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            warn!(%method, status = status.as_u16(), "call: undecodable response");
            TransportError::Json(e)
        })?;

        match parsed {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                error_code,
                description,
                ..
            } => {
                warn!(%method, error_code, %description, "call: api error");
                Err(TransportError::Api {
                    code: error_code,
                    description,
                })
            }
        }
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TransportError> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": self.poll_timeout.as_secs(),
            "allowed_updates": ["message", "callback_query"],
        });
        let updates: Vec<Update> = self.call("getUpdates", body).await?;
        debug!(count = updates.len(), offset, "get_updates: received");
        Ok(updates)
    }
}

/// Inline keyboard with one button per row
fn inline_keyboard(options: &[PromptOption]) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = options
        .iter()
        .map(|o| serde_json::json!([{ "text": o.label, "callback_data": o.token }]))
        .collect();
    serde_json::json!({ "inline_keyboard": rows })
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<MessageId, TransportError> {
        let body = serde_json::json!({ "chat_id": chat, "text": text });
        let sent: SentMessage = self.call("sendMessage", body).await?;
        Ok(sent.message_id)
    }

    async fn send_prompt(
        &self,
        chat: ChatId,
        text: &str,
        options: &[PromptOption],
    ) -> Result<MessageId, TransportError> {
        let body = serde_json::json!({
            "chat_id": chat,
            "text": text,
            "reply_markup": inline_keyboard(options),
        });
        let sent: SentMessage = self.call("sendMessage", body).await?;
        Ok(sent.message_id)
    }

    async fn edit_text(&self, chat: ChatId, message: MessageId, text: &str) -> Result<(), TransportError> {
        let body = serde_json::json!({ "chat_id": chat, "message_id": message, "text": text });
        // Result is the edited Message; only success matters here
        let _: serde_json::Value = self.call("editMessageText", body).await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), TransportError> {
        let body = serde_json::json!({ "callback_query_id": callback_id });
        let _: bool = self.call("answerCallbackQuery", body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_one_button_per_row() {
        let keyboard = inline_keyboard(&[
            PromptOption::new("Odenplan (stop)", "home_1_0"),
            PromptOption::new("Odenplan Norra (stop)", "home_1_1"),
        ]);
        let rows = keyboard["inline_keyboard"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0]["text"], "Odenplan Norra (stop)");
        assert_eq!(rows[1][0]["callback_data"], "home_1_1");
    }

    #[test]
    fn test_update_deserialization() {
        let json = r#"[
            {"update_id": 10, "message": {"message_id": 5, "chat": {"id": 42}, "from": {"id": 42, "username": "ana"}, "text": "to work"}},
            {"update_id": 11, "callback_query": {"id": "cb1", "from": {"id": 42}, "message": {"message_id": 6, "chat": {"id": 42}}, "data": "home_42_1"}}
        ]"#;
        let updates: Vec<Update> = serde_json::from_str(json).unwrap();
        assert_eq!(updates[0].message.as_ref().unwrap().text.as_deref(), Some("to work"));
        let cb = updates[1].callback_query.as_ref().unwrap();
        assert_eq!(cb.data.as_deref(), Some("home_42_1"));
        assert_eq!(cb.message.as_ref().unwrap().message_id, 6);
    }

    #[test]
    fn test_api_error_envelope() {
        let parsed: ApiResponse<SentMessage> =
            serde_json::from_str(r#"{"ok": false, "error_code": 403, "description": "Forbidden: bot was blocked"}"#)
                .unwrap();
        assert!(!parsed.ok);
        assert!(parsed.result.is_none());
        assert_eq!(parsed.error_code, 403);
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(TelegramClient::new("https://api.telegram.org", "", Duration::from_secs(1)).is_err());
    }
}
