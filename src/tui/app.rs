//! Terminal app state and key handling.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use open_craft_engine::{Catalog, CatalogSource, LedgerError, Session, suggest_untried};
use ratatui::widgets::ListState;
use tracing::{debug, info, instrument, warn};

use crate::messages;

/// Entries of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    /// Two-field combine form.
    Combine,
    /// Sorted discovered list.
    Discovered,
    /// Static hints.
    Hints,
    /// Commit and leave.
    SaveAndExit,
    /// Enumerator output (developer mode).
    Untried,
    /// Random untried suggestions over a freshly reloaded catalog (developer mode).
    RecipeCreator,
}

impl MenuOption {
    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Combine => "🔮 Combine Elements",
            Self::Discovered => "📚 View Discovered Elements",
            Self::Hints => "💡 Show Hints",
            Self::SaveAndExit => "💾 Save and Exit",
            Self::Untried => "🔍 View Untried Combinations (Dev)",
            Self::RecipeCreator => "⚡ Recipe Creator Flow (Dev)",
        }
    }

    /// Options shown for the given mode.
    pub fn all(developer: bool) -> Vec<MenuOption> {
        let mut options = vec![Self::Combine, Self::Discovered, Self::Hints, Self::SaveAndExit];
        if developer {
            options.extend([Self::Untried, Self::RecipeCreator]);
        }
        options
    }
}

/// Which combine field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// First element.
    First,
    /// Second element.
    Second,
}

/// State of the combine form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineForm {
    /// First element input.
    pub first: String,
    /// Second element input.
    pub second: String,
    /// Focused field.
    pub focus: Field,
    /// Outcome of the last attempt.
    pub message: Option<String>,
}

impl CombineForm {
    fn new() -> Self {
        Self {
            first: String::new(),
            second: String::new(),
            focus: Field::First,
            message: None,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::First => &mut self.first,
            Field::Second => &mut self.second,
        }
    }
}

/// State of the recipe creator screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorState {
    /// Untried pairs left in the reloaded catalog.
    pub remaining: usize,
    /// Current suggestion.
    pub suggestion: Option<String>,
    /// Reload failure.
    pub error: Option<String>,
}

/// Active screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Main menu.
    MainMenu,
    /// Combine form.
    Combine(CombineForm),
    /// Discovered list with scroll offset.
    Discovered {
        /// First visible line.
        offset: usize,
    },
    /// Hints.
    Hints,
    /// Untried list with scroll offset.
    Untried {
        /// First visible line.
        offset: usize,
    },
    /// Recipe creator.
    RecipeCreator(CreatorState),
}

/// What the event loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    /// Keep running.
    Continue,
    /// Leave the app.
    Quit,
}

/// Terminal app for the local player.
#[derive(Debug)]
pub struct App {
    session: Session,
    data_dir: Option<PathBuf>,
    screen: Screen,
    menu_state: ListState,
    status: Option<String>,
}

impl App {
    /// Creates the app. A data directory enables developer mode.
    #[instrument(skip(session))]
    pub fn new(session: Session, data_dir: Option<PathBuf>) -> Self {
        let mut menu_state = ListState::default();
        menu_state.select(Some(0));
        Self {
            session,
            data_dir,
            screen: Screen::MainMenu,
            menu_state,
            status: None,
        }
    }

    /// Player session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Active screen.
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Menu selection.
    pub fn menu_state(&self) -> &ListState {
        &self.menu_state
    }

    /// Last status line (save results).
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Returns true when developer options are shown.
    pub fn developer(&self) -> bool {
        self.data_dir.is_some()
    }

    /// Menu entries for this mode.
    pub fn menu_options(&self) -> Vec<MenuOption> {
        MenuOption::all(self.developer())
    }

    /// Commits progress and records the outcome in the status line.
    #[instrument(skip(self))]
    pub fn save(&mut self) -> Result<(), LedgerError> {
        match self.session.commit() {
            Ok(()) => {
                info!("Progress saved");
                self.status = Some("Progress saved.".to_string());
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Save failed");
                self.status = Some(format!("Failed to save progress: {}", e.message));
                Err(e)
            }
        }
    }

    /// Commits if anything is unsaved. Called on every exit path.
    pub fn finish(&mut self) -> Result<(), LedgerError> {
        if self.session.is_dirty() {
            self.save()
        } else {
            Ok(())
        }
    }

    /// Largest scroll offset that still shows a line on a list screen.
    pub fn max_scroll(&self) -> usize {
        let lines = match self.screen {
            Screen::Discovered { .. } => self.session.discovered_list().len(),
            Screen::Untried { .. } => match self.session.untried_combinations().len() {
                0 => 1,
                n => n + 2,
            },
            _ => 0,
        };
        lines.saturating_sub(1)
    }

    /// Handles one key press.
    #[instrument(skip(self), fields(key = ?key.code))]
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppAction::Quit;
        }

        let max_scroll = self.max_scroll();
        match &mut self.screen {
            Screen::MainMenu => return self.handle_menu_key(key),
            Screen::Combine(_) => self.handle_combine_key(key),
            Screen::Discovered { offset } | Screen::Untried { offset } => match key.code {
                KeyCode::Up | KeyCode::Char('k') => *offset = offset.saturating_sub(1),
                KeyCode::Down | KeyCode::Char('j') => *offset = (*offset + 1).min(max_scroll),
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.screen = Screen::MainMenu,
                _ => {}
            },
            Screen::Hints => self.screen = Screen::MainMenu,
            Screen::RecipeCreator(_) => match key.code {
                KeyCode::Char('n') | KeyCode::Char('1') | KeyCode::Enter => self.open_creator(),
                _ => self.screen = Screen::MainMenu,
            },
        }
        AppAction::Continue
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> AppAction {
        let options = self.menu_options();
        let count = options.len();
        match key.code {
            KeyCode::Up => {
                let i = match self.menu_state.selected() {
                    Some(i) if i > 0 => i - 1,
                    _ => count - 1,
                };
                self.menu_state.select(Some(i));
            }
            KeyCode::Down => {
                let i = self.menu_state.selected().map_or(0, |i| (i + 1) % count);
                self.menu_state.select(Some(i));
            }
            KeyCode::Enter => {
                let idx = self.menu_state.selected().unwrap_or(0).min(count - 1);
                return self.choose(options[idx]);
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let idx = c.to_digit(10).map_or(0, |d| d as usize);
                if (1..=count).contains(&idx) {
                    self.menu_state.select(Some(idx - 1));
                    return self.choose(options[idx - 1]);
                }
            }
            KeyCode::Char('s') => {
                let _ = self.save();
            }
            KeyCode::Char('q') | KeyCode::Esc => return AppAction::Quit,
            _ => {}
        }
        AppAction::Continue
    }

    fn choose(&mut self, option: MenuOption) -> AppAction {
        info!(?option, "Menu option selected");
        self.status = None;
        match option {
            MenuOption::Combine => self.screen = Screen::Combine(CombineForm::new()),
            MenuOption::Discovered => self.screen = Screen::Discovered { offset: 0 },
            MenuOption::Hints => self.screen = Screen::Hints,
            MenuOption::SaveAndExit => {
                // Leave even when the write fails; the caller reports it.
                let _ = self.save();
                return AppAction::Quit;
            }
            MenuOption::Untried => self.screen = Screen::Untried { offset: 0 },
            MenuOption::RecipeCreator => self.open_creator(),
        }
        AppAction::Continue
    }

    fn handle_combine_key(&mut self, key: KeyEvent) {
        let Screen::Combine(form) = &mut self.screen else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.screen = Screen::MainMenu,
            KeyCode::Tab | KeyCode::BackTab => {
                form.focus = match form.focus {
                    Field::First => Field::Second,
                    Field::Second => Field::First,
                };
            }
            KeyCode::Backspace => {
                form.focused_mut().pop();
            }
            KeyCode::Char(c) => form.focused_mut().push(c),
            KeyCode::Enter if form.focus == Field::First => form.focus = Field::Second,
            KeyCode::Enter => {
                let (first, second) = (form.first.clone(), form.second.clone());
                let message = self.combine(&first, &second);
                if let Screen::Combine(form) = &mut self.screen {
                    *form = CombineForm {
                        message: Some(message),
                        ..CombineForm::new()
                    };
                }
            }
            _ => {}
        }
    }

    fn combine(&mut self, first: &str, second: &str) -> String {
        let report = self.session.combine(first, second);
        let message = messages::describe(self.session.catalog(), report.outcome());
        debug!(%message, "Combine attempted");
        message
    }

    /// Reloads the catalog from disk and picks a fresh suggestion.
    fn open_creator(&mut self) {
        let Some(dir) = self.data_dir.clone() else {
            self.screen = Screen::MainMenu;
            return;
        };
        let normalizer = *self.session.catalog().normalizer();
        let state = match Catalog::load(&CatalogSource::Directory(dir), normalizer) {
            Ok(catalog) => {
                let untried = catalog.untried_combinations();
                CreatorState {
                    remaining: untried.len(),
                    suggestion: suggest_untried(&untried, &mut rand::rng()).map(|c| c.to_string()),
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "Catalog reload failed");
                CreatorState {
                    remaining: 0,
                    suggestion: None,
                    error: Some(format!("Error reloading game state: {}", e)),
                }
            }
        };
        self.screen = Screen::RecipeCreator(state);
    }
}
