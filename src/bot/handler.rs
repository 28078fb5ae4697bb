//! Conversation handling for the chat bot.

use std::collections::HashMap;
use std::fmt::Write as _;

use open_craft_engine::{CombineOutcome, Identity, Session, SessionDirectory};
use tracing::{debug, info, instrument, warn};

use super::{ChatTransport, IncomingMessage, Keyboard, MenuButton, OutgoingMessage, parse_category};
use crate::{StoragePaths, messages};

const WELCOME: &str = "Welcome to Open Craft! 🌟\nCombine elements to discover new ones!";
const CHOOSE_OPTION: &str = "Choose an option:";
const CHOOSE_CATEGORY: &str = "Select a category to view discovered elements:";
const ENTER_SECOND: &str = "Enter the second element:";
const NOT_DISCOVERED_RETRY: &str = "You haven't discovered this element yet! Try another one.";
const EMPTY_CATEGORY: &str = "No elements discovered in this category yet!";
const NO_SAVE_FILE: &str = "No save file found";
const UNCATEGORIZED: &str = "Uncategorized";

/// Where a chat is in the combine flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversation {
    /// Waiting for the first element.
    AwaitingFirst,
    /// Waiting for the second element.
    AwaitingSecond {
        /// Accepted first element, as typed.
        first: String,
    },
}

/// Turns incoming chat messages into replies.
///
/// Every chat id is its own player; progress is committed after each
/// successful combine.
#[derive(Debug)]
pub struct BotHandler {
    directory: SessionDirectory,
    paths: StoragePaths,
    conversations: HashMap<i64, Conversation>,
}

impl BotHandler {
    /// Creates a handler over a session directory and the save layout used
    /// for save-file downloads.
    #[instrument(skip(directory))]
    pub fn new(directory: SessionDirectory, paths: StoragePaths) -> Self {
        Self {
            directory,
            paths,
            conversations: HashMap::new(),
        }
    }

    /// Pending combine state for a chat.
    pub fn conversation(&self, chat_id: i64) -> Option<&Conversation> {
        self.conversations.get(&chat_id)
    }

    /// Handles one message and returns the replies in send order.
    #[instrument(skip(self, message), fields(chat_id = message.chat_id))]
    pub fn handle(&mut self, message: &IncomingMessage) -> Vec<OutgoingMessage> {
        let chat_id = message.chat_id;
        let text = message.text.trim();

        if text == "/start" {
            self.conversations.remove(&chat_id);
            return vec![OutgoingMessage::text(chat_id, WELCOME), main_menu(chat_id)];
        }

        if let Ok(button) = text.parse::<MenuButton>() {
            debug!(?button, "Menu button");
            self.conversations.remove(&chat_id);
            return self.handle_button(chat_id, button);
        }

        if let Some(category) = parse_category(text) {
            self.conversations.remove(&chat_id);
            let body = self.with_session(chat_id, |session| {
                let mut body = format!("{} Elements:\n\n", category);
                let elements = session.discovered_in_category(category);
                if elements.is_empty() {
                    body.push_str(EMPTY_CATEGORY);
                }
                for element in elements {
                    let _ = writeln!(body, "- {}", element.name());
                }
                body
            });
            return vec![OutgoingMessage::with_keyboard(chat_id, body, Keyboard::listing_nav())];
        }

        match self.conversations.get(&chat_id).cloned() {
            Some(Conversation::AwaitingFirst) => self.accept_first(chat_id, text),
            Some(Conversation::AwaitingSecond { first }) => self.accept_second(chat_id, &first, text),
            None => {
                debug!("Ignoring free text outside the combine flow");
                Vec::new()
            }
        }
    }

    fn handle_button(&mut self, chat_id: i64, button: MenuButton) -> Vec<OutgoingMessage> {
        match button {
            MenuButton::Combine => {
                self.conversations.insert(chat_id, Conversation::AwaitingFirst);
                let body = self.with_session(chat_id, |session| {
                    let mut body = String::from("Available Elements:\n\n");
                    for element in session.discovered_list() {
                        let _ = writeln!(body, "- {}", element.name());
                    }
                    body.push_str("\nEnter the first element:");
                    body
                });
                vec![OutgoingMessage::text(chat_id, body)]
            }
            MenuButton::Discovered | MenuButton::BackToCategories => {
                vec![OutgoingMessage::with_keyboard(chat_id, CHOOSE_CATEGORY, Keyboard::categories())]
            }
            MenuButton::Hints => vec![OutgoingMessage::text(chat_id, messages::HINTS)],
            MenuButton::DownloadSave => vec![self.save_file(chat_id)],
            MenuButton::ShowAll => {
                let body = self.with_session(chat_id, |session| {
                    let elements = session.discovered_list();
                    let mut body = format!("All Discovered Elements ({} total):\n\n", elements.len());
                    for element in elements {
                        let category = element
                            .category()
                            .map_or_else(|| UNCATEGORIZED.to_string(), |c| c.to_string());
                        let _ = writeln!(body, "- {} ({})", element.name(), category);
                    }
                    body
                });
                vec![OutgoingMessage::with_keyboard(chat_id, body, Keyboard::listing_nav())]
            }
            MenuButton::MainMenu => vec![main_menu(chat_id)],
        }
    }

    fn accept_first(&mut self, chat_id: i64, text: &str) -> Vec<OutgoingMessage> {
        if !self.with_session(chat_id, |session| session.is_discovered(text)) {
            return vec![OutgoingMessage::text(chat_id, NOT_DISCOVERED_RETRY)];
        }
        self.conversations.insert(
            chat_id,
            Conversation::AwaitingSecond {
                first: text.to_string(),
            },
        );
        vec![OutgoingMessage::text(chat_id, ENTER_SECOND)]
    }

    fn accept_second(&mut self, chat_id: i64, first: &str, text: &str) -> Vec<OutgoingMessage> {
        let reply = self.with_session(chat_id, |session| {
            if !session.is_discovered(text) {
                return None;
            }
            let report = session.combine(first, text);
            let mut reply = match report.outcome() {
                CombineOutcome::Created { .. } => {
                    format!("✨ {}", messages::describe(session.catalog(), report.outcome()))
                }
                CombineOutcome::Undiscovered { .. } => format!("❌ {}", messages::NOT_DISCOVERED),
                CombineOutcome::NoRecipe => format!("❌ {}", messages::CANNOT_COMBINE),
            };
            if let Some(e) = report.save_error() {
                warn!(chat_id, error = %e, "Progress not saved");
                reply.push_str("\n⚠️ Your progress could not be saved.");
            }
            Some(reply)
        });

        match reply {
            None => vec![OutgoingMessage::text(chat_id, NOT_DISCOVERED_RETRY)],
            Some(reply) => {
                self.conversations.remove(&chat_id);
                vec![OutgoingMessage::text(chat_id, reply), main_menu(chat_id)]
            }
        }
    }

    fn save_file(&self, chat_id: i64) -> OutgoingMessage {
        let path = self.paths.player_progress(chat_id);
        if !path.exists() {
            return OutgoingMessage::text(chat_id, NO_SAVE_FILE);
        }
        let count = self.with_session(chat_id, |session| session.ledger().len());
        OutgoingMessage::Document {
            chat_id,
            path,
            caption: format!("Your save file containing {} discovered elements", count),
        }
    }

    fn with_session<T>(&self, chat_id: i64, f: impl FnOnce(&mut Session) -> T) -> T {
        self.directory.with_session(&Identity::Player(chat_id), f)
    }
}

fn main_menu(chat_id: i64) -> OutgoingMessage {
    OutgoingMessage::with_keyboard(chat_id, CHOOSE_OPTION, Keyboard::main_menu())
}

/// Consumes updates one at a time until the transport closes.
#[instrument(skip_all)]
pub async fn run<T: ChatTransport>(transport: &mut T, handler: &mut BotHandler) -> anyhow::Result<()> {
    info!("Chat bot started");
    while let Some(message) = transport.next_message().await? {
        for reply in handler.handle(&message) {
            transport.send(reply).await?;
        }
    }
    info!("Transport closed, chat bot stopping");
    Ok(())
}
