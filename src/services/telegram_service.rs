use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const NOT_A_MESSAGE_REPLY: &str = "The update received was not of Message type.";

// ==================== UPDATE MODELS ====================

#[derive(Debug, Default, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub from: Option<Sender>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub from: Sender,
}

#[derive(Debug, Deserialize)]
pub struct Sender {
    pub id: i64,
}

impl Update {
    /// Sender of a callback query, else of a message.
    pub fn chat_id(&self) -> Option<i64> {
        if let Some(query) = &self.callback_query {
            return Some(query.from.id);
        }
        self.message
            .as_ref()
            .and_then(|m| m.from.as_ref())
            .map(|from| from.id)
    }

    pub fn echo_text(&self) -> String {
        match &self.message {
            Some(message) => format!(
                "Echoed message: {}",
                message.text.as_deref().unwrap_or_default()
            ),
            None => NOT_A_MESSAGE_REPLY.to_string(),
        }
    }
}

// ==================== CLIENT ====================

/// Error body returned to the webhook caller when `sendMessage` fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendFailure {
    pub ok: bool,
    pub status_code: Option<u16>,
    pub reason: String,
}

pub struct TelegramBot {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl TelegramBot {
    pub fn new(token: &str, api_base: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("⚠️ Falling back to default HTTP client for Telegram: {}", e);
                reqwest::Client::new()
            });

        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }

    /// Sends `text` to `chat_id` with HTML parse mode.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Value, SendFailure> {
        let chat_id = chat_id.to_string();
        let form = [
            ("chat_id", chat_id.as_str()),
            ("text", text),
            ("parse_mode", "HTML"),
        ];

        let response = self
            .http
            .post(self.send_message_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                log::error!("❌ Error occurred while sending message via Telegram Bot API: {}", e);
                SendFailure {
                    ok: false,
                    status_code: e.status().map(|s| s.as_u16()),
                    reason: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            log::error!(
                "❌ Error occurred while sending message via Telegram Bot API: {}",
                status
            );
            return Err(SendFailure {
                ok: false,
                status_code: Some(status.as_u16()),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let ack: Value = response.json().await.map_err(|e| SendFailure {
            ok: false,
            status_code: Some(status.as_u16()),
            reason: format!("invalid response body: {}", e),
        })?;

        log::info!("✅ Message sent to {} via Telegram Bot API.", chat_id);
        Ok(ack)
    }
}
