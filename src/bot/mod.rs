//! Chat bot front-end.
//!
//! Transport-agnostic: [`BotHandler`] maps messages to replies and
//! [`ChatTransport`] moves them over the wire.

mod handler;
mod keyboard;
mod transport;

pub use handler::{BotHandler, Conversation, run};
pub use keyboard::{Keyboard, MenuButton, category_label, parse_category};
pub use transport::{ChatTransport, IncomingMessage, OutgoingMessage, StdioTransport};
