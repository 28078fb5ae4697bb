//! Terminal front-end for the local player.

mod app;
mod ui;

pub use app::{App, AppAction, CombineForm, CreatorState, Field, MenuOption, Screen};

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use tracing::{error, info, instrument};

/// Runs the terminal app until the player quits, then commits any unsaved
/// progress.
#[instrument(skip(app))]
pub fn run(mut app: App) -> Result<()> {
    info!("Starting terminal UI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let res = event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let saved = app.finish();

    if let Err(err) = &res {
        error!(error = ?err, "Terminal loop error");
    }
    match saved {
        Ok(()) => println!("Thanks for playing! Your progress has been saved."),
        Err(e) => eprintln!("Failed to save progress: {}", e),
    }
    res
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    <B as Backend>::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
        {
            if key.kind == KeyEventKind::Release {
                continue;
            }
            if app.handle_key(key) == AppAction::Quit {
                info!("Player quit");
                return Ok(());
            }
        }
    }
}
