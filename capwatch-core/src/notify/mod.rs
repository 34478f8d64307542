//! Message delivery: sink trait, Telegram implementation, disabled stand-in.

pub mod telegram;

use thiserror::Error;

pub use telegram::TelegramSink;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery credentials missing")]
    MissingCredentials,

    #[error("network error: {0}")]
    Network(String),

    #[error("delivery rejected: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Trait for message sinks so the pipeline can run against Telegram in
/// production and a recording sink in tests.
pub trait MessageSink {
    /// Human-readable name of this sink.
    fn name(&self) -> &str;

    /// Deliver one plain-text message.
    fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Stand-in used when credentials are not configured: logs the skip and
/// reports success so the run completes normally.
pub struct DisabledSink;

impl MessageSink for DisabledSink {
    fn name(&self) -> &str {
        "disabled"
    }

    fn send(&self, text: &str) -> Result<(), NotifyError> {
        tracing::warn!(
            chars = text.chars().count(),
            "delivery credentials missing; message not sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_sink_swallows_messages() {
        let sink = DisabledSink;
        assert!(sink.send("hello").is_ok());
        assert_eq!(sink.name(), "disabled");
    }
}
