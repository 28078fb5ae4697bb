//! Chat network abstraction and the JSON-lines stdio transport.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
use tracing::{debug, instrument, warn};

use super::Keyboard;

/// A text message from a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct IncomingMessage {
    /// Numeric chat id; doubles as the player identity.
    pub chat_id: i64,
    /// Message text or pressed button label.
    #[new(into)]
    pub text: String,
}

/// Something the bot sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingMessage {
    /// Plain text, optionally replacing the reply keyboard.
    Text {
        /// Target chat.
        chat_id: i64,
        /// Message body.
        text: String,
        /// New reply keyboard.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        keyboard: Option<Keyboard>,
    },
    /// A file attachment.
    Document {
        /// Target chat.
        chat_id: i64,
        /// File to send.
        path: PathBuf,
        /// Caption under the file.
        caption: String,
    },
}

impl OutgoingMessage {
    /// Text without a keyboard.
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self::Text {
            chat_id,
            text: text.into(),
            keyboard: None,
        }
    }

    /// Text with a reply keyboard.
    pub fn with_keyboard(chat_id: i64, text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self::Text {
            chat_id,
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    /// Text body, if this is a text message.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            Self::Document { .. } => None,
        }
    }
}

/// A chat network connection.
#[async_trait]
pub trait ChatTransport: Send {
    /// Waits for the next message; `None` once the connection closes.
    async fn next_message(&mut self) -> Result<Option<IncomingMessage>>;

    /// Delivers a reply.
    async fn send(&mut self, message: OutgoingMessage) -> Result<()>;
}

/// Reads one [`IncomingMessage`] JSON object per stdin line and writes one
/// [`OutgoingMessage`] per stdout line.
///
/// Logging must go to stderr while this transport is active.
#[derive(Debug)]
pub struct StdioTransport {
    lines: Lines<BufReader<Stdin>>,
    stdout: Stdout,
}

impl StdioTransport {
    /// Attaches to the process's stdin and stdout.
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            stdout: tokio::io::stdout(),
        }
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for StdioTransport {
    #[instrument(skip(self))]
    async fn next_message(&mut self) -> Result<Option<IncomingMessage>> {
        while let Some(line) = self
            .lines
            .next_line()
            .await
            .context("Failed to read line from stdin")?
        {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<IncomingMessage>(&line) {
                Ok(message) => {
                    debug!(chat_id = message.chat_id, "Received message");
                    return Ok(Some(message));
                }
                Err(e) => warn!(error = %e, line = %line, "Skipping malformed update"),
            }
        }
        debug!("Stdin closed");
        Ok(None)
    }

    #[instrument(skip(self, message))]
    async fn send(&mut self, message: OutgoingMessage) -> Result<()> {
        let mut line = serde_json::to_string(&message).context("Failed to serialize reply")?;
        line.push('\n');
        self.stdout
            .write_all(line.as_bytes())
            .await
            .context("Failed to write reply to stdout")?;
        self.stdout.flush().await.context("Failed to flush stdout")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incoming_wire_format() {
        let message: IncomingMessage =
            serde_json::from_str(r#"{"chat_id": 12, "text": "/start"}"#).unwrap();
        assert_eq!(message, IncomingMessage::new(12, "/start"));
    }

    #[test]
    fn test_outgoing_wire_format() {
        let json = serde_json::to_value(OutgoingMessage::text(3, "hi")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "text", "chat_id": 3, "text": "hi"}));
    }
}
