//! Reply keyboards and the button labels they carry.

use open_craft_engine::Category;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Fixed menu buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum MenuButton {
    /// Start the two-step combine flow.
    #[strum(serialize = "🔮 Combine Elements")]
    Combine,
    /// Open the category browser.
    #[strum(serialize = "📚 Discovered Elements")]
    Discovered,
    /// Show gameplay hints.
    #[strum(serialize = "💡 Show Hints")]
    Hints,
    /// Send the save file.
    #[strum(serialize = "📥 Download Save")]
    DownloadSave,
    /// List every discovered element.
    #[strum(serialize = "📋 Show All Discovered")]
    ShowAll,
    /// Return to the category browser.
    #[strum(serialize = "◀️ Back to Categories")]
    BackToCategories,
    /// Return to the main menu.
    #[strum(serialize = "🏠 Main Menu")]
    MainMenu,
}

/// Rows of reply buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    /// Button labels, row by row.
    pub rows: Vec<Vec<String>>,
}

impl Keyboard {
    fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Main menu: combine, browse, hints, download.
    pub fn main_menu() -> Self {
        Self::from_rows(vec![
            vec![MenuButton::Combine.to_string(), MenuButton::Discovered.to_string()],
            vec![MenuButton::Hints.to_string(), MenuButton::DownloadSave.to_string()],
        ])
    }

    /// Category browser: two categories per row, then Show All.
    pub fn categories() -> Self {
        let labels: Vec<String> = Category::all().into_iter().map(category_label).collect();
        let mut rows: Vec<Vec<String>> = labels.chunks(2).map(<[String]>::to_vec).collect();
        rows.push(vec![MenuButton::ShowAll.to_string()]);
        Self::from_rows(rows)
    }

    /// Navigation under a listing.
    pub fn listing_nav() -> Self {
        Self::from_rows(vec![vec![
            MenuButton::BackToCategories.to_string(),
            MenuButton::MainMenu.to_string(),
        ]])
    }
}

/// Button label for a category, e.g. `🌟 Primordial`.
pub fn category_label(category: Category) -> String {
    format!("{} {}", category.emoji(), category)
}

/// Category named by a button label, if any.
pub fn parse_category(text: &str) -> Option<Category> {
    Category::all()
        .into_iter()
        .find(|category| category_label(*category) == text)
}
