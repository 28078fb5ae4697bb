//! Rendering for the terminal app.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use super::app::{App, CombineForm, CreatorState, Field, Screen};
use crate::messages;

/// Draws the whole frame.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let title = Paragraph::new(format!(
        "🌟 Open Craft 🌟   {}",
        messages::progress(app.session().progress())
    ))
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let help = match app.screen() {
        Screen::MainMenu => "↑↓: Navigate | Enter/1-6: Select | s: Save | q: Quit",
        Screen::Combine(_) => "Type element names | Tab: Switch field | Enter: Next/Combine | Esc: Back",
        Screen::Discovered { .. } | Screen::Untried { .. } => "↑↓: Scroll | Esc: Back",
        Screen::Hints => "Any key: Back",
        Screen::RecipeCreator(_) => "n: Next combination | Esc: Back",
    };

    match app.screen() {
        Screen::MainMenu => render_menu(frame, app, chunks[1]),
        Screen::Combine(form) => render_combine(frame, app, form, chunks[1]),
        Screen::Discovered { offset } => {
            let lines: Vec<Line> = app
                .session()
                .discovered_list()
                .into_iter()
                .map(|e| Line::from(format!("- {}", e.name())))
                .collect();
            render_scrolled(frame, "Discovered Elements", lines, *offset, chunks[1]);
        }
        Screen::Hints => {
            let hints = Paragraph::new(messages::HINTS)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title("Hints"));
            frame.render_widget(hints, chunks[1]);
        }
        Screen::Untried { offset } => {
            let combos = app.session().untried_combinations();
            let mut lines = Vec::with_capacity(combos.len() + 2);
            if combos.is_empty() {
                lines.push(Line::from("You've tried all possible combinations!"));
            } else {
                lines.push(Line::from(format!("Found {} untried combinations:", combos.len())));
                lines.push(Line::from(""));
                lines.extend(combos.iter().map(|c| Line::from(c.to_string())));
            }
            render_scrolled(frame, "Untried Combinations", lines, *offset, chunks[1]);
        }
        Screen::RecipeCreator(state) => render_creator(frame, state, chunks[1]),
    }

    let footer = app.status().unwrap_or(help);
    let footer = Paragraph::new(footer)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, chunks[2]);
}

fn render_menu(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .menu_options()
        .iter()
        .enumerate()
        .map(|(i, option)| ListItem::new(format!("{}. {}", i + 1, option.label())))
        .collect();
    let menu = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Menu"))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut state = app.menu_state().clone();
    frame.render_stateful_widget(menu, area, &mut state);
}

fn render_combine(frame: &mut Frame, app: &App, form: &CombineForm, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let available: Vec<ListItem> = app
        .session()
        .discovered_list()
        .into_iter()
        .map(|e| ListItem::new(format!("- {}", e.name())))
        .collect();
    frame.render_widget(
        List::new(available).block(Block::default().borders(Borders::ALL).title("Available Elements")),
        chunks[0],
    );

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(3)])
        .split(chunks[1]);

    for (i, (label, value, field)) in [
        ("First element", &form.first, Field::First),
        ("Second element", &form.second, Field::Second),
    ]
    .into_iter()
    .enumerate()
    {
        let style = if form.focus == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let input = Paragraph::new(value.as_str())
            .style(style)
            .block(Block::default().borders(Borders::ALL).title(label));
        frame.render_widget(input, right[i]);
    }

    let message = form.message.as_deref().unwrap_or("");
    let color = if message.starts_with("You created") {
        Color::Green
    } else {
        Color::Red
    };
    let result = Paragraph::new(message)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Result"));
    frame.render_widget(result, right[2]);
}

fn render_creator(frame: &mut Frame, state: &CreatorState, area: Rect) {
    let text = match (&state.error, &state.suggestion) {
        (Some(error), _) => error.clone(),
        (None, None) => "No more combinations available to create recipes for!".to_string(),
        (None, Some(suggestion)) => format!(
            "Remaining possible combinations: {}\n\nSuggested combination to create recipe for:\n{}",
            state.remaining, suggestion
        ),
    };
    let body = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Recipe Creator Flow"));
    frame.render_widget(body, area);
}

fn render_scrolled(frame: &mut Frame, title: &str, lines: Vec<Line>, offset: usize, area: Rect) {
    let offset = u16::try_from(offset.min(lines.len().saturating_sub(1))).unwrap_or(u16::MAX);
    let body = Paragraph::new(lines)
        .scroll((offset, 0))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(body, area);
}
