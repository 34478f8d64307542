//! Telegram Bot API message sink.
//!
//! One `sendMessage` call per message, blocking, attempted exactly once.
//! A non-2xx response surfaces as `NotifyError::Rejected` with the body so
//! the caller can log why Telegram refused the message.

use super::{MessageSink, NotifyError};
use std::time::Duration;

pub struct TelegramSink {
    client: reqwest::blocking::Client,
    token: String,
    chat_id: String,
}

impl TelegramSink {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            token: token.into(),
            chat_id: chat_id.into(),
        }
    }

    fn send_url(&self) -> String {
        format!("https://api.telegram.org/bot{}/sendMessage", self.token)
    }
}

impl MessageSink for TelegramSink {
    fn name(&self) -> &str {
        "telegram"
    }

    fn send(&self, text: &str) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(self.send_url())
            .form(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
