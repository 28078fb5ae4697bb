//! Open Craft - unified CLI
//!
//! Play in the terminal, run the chat bot or serve the HTTP API.

#![warn(missing_docs)]

mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use open_craft::bot::{self, BotHandler, StdioTransport};
use open_craft::tui::{self, App};
use open_craft::{AppConfig, FileStore, StoragePaths, server};
use open_craft_engine::{
    Catalog, CatalogError, CommitPolicy, Identity, Session, SessionDirectory, suggest_untried,
};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,open_craft=debug,open_craft_engine=debug";
const TUI_LOG_FILE: &str = "open_craft.log";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Command::Play);

    let config = AppConfig::load(cli.config.as_deref())?
        .with_overrides(cli.data_dir.clone(), cli.save_dir.clone());
    let paths = StoragePaths::resolve(config.save_dir().as_deref())?;

    match command {
        Command::Play => {
            init_file_tracing(paths.root())?;
            run_terminal(&config, paths)
        }
        Command::Bot => {
            init_stderr_tracing();
            run_bot(&config, paths).await
        }
        Command::Http { host, port } => {
            init_stderr_tracing();
            run_http(config.with_http(host, port), paths).await
        }
        Command::Untried { random } => {
            init_stderr_tracing();
            run_untried(&config, random)
        }
        Command::Validate => {
            init_stderr_tracing();
            run_validate(&config)
        }
    }
}

/// Loads the configured catalog; any content error is fatal.
#[instrument(skip(config))]
fn load_catalog(config: &AppConfig) -> Result<Arc<Catalog>> {
    let source = config.catalog_source();
    let catalog = Catalog::load(&source, config.normalizer())
        .with_context(|| format!("Failed to load catalog from {:?}", source))?;
    Ok(Arc::new(catalog))
}

/// Run the terminal game for the local player
#[instrument(skip(config, paths))]
fn run_terminal(config: &AppConfig, paths: StoragePaths) -> Result<()> {
    let catalog = load_catalog(config)?;
    let store = Arc::new(FileStore::new(paths));
    let session = Session::open(Identity::Local, catalog, store, CommitPolicy::Deferred);
    tui::run(App::new(session, config.data_dir().clone()))
}

/// Run the chat bot over stdin/stdout
#[instrument(skip(config, paths))]
async fn run_bot(config: &AppConfig, paths: StoragePaths) -> Result<()> {
    let catalog = load_catalog(config)?;
    let store = Arc::new(FileStore::new(paths.clone()));
    let directory = SessionDirectory::new(catalog, store, CommitPolicy::Immediate);
    let mut handler = BotHandler::new(directory, paths);
    let mut transport = StdioTransport::new();
    bot::run(&mut transport, &mut handler).await
}

/// Run the HTTP server
#[instrument(skip(config, paths))]
async fn run_http(config: AppConfig, paths: StoragePaths) -> Result<()> {
    let catalog = load_catalog(&config)?;
    let store = Arc::new(FileStore::new(paths));
    let directory = SessionDirectory::new(catalog, store, CommitPolicy::Immediate);
    info!(host = %config.http().host(), port = config.http().port(), "Starting HTTP server");
    server::serve(directory, config.http().host(), *config.http().port()).await
}

/// Print untried combinations
#[instrument(skip(config))]
fn run_untried(config: &AppConfig, random: bool) -> Result<()> {
    let catalog = load_catalog(config)?;
    let combos = catalog.untried_combinations();

    if combos.is_empty() {
        println!("You've tried all possible combinations!");
        return Ok(());
    }

    if random {
        if let Some(pick) = suggest_untried(&combos, &mut rand::rng()) {
            println!("Remaining possible combinations: {}", combos.len());
            println!("Suggested combination to create recipe for:\n{}", pick);
        }
        return Ok(());
    }

    println!("Found {} untried combinations:\n", combos.len());
    for combo in &combos {
        println!("{}", combo);
    }
    Ok(())
}

/// Validate the catalog and report counts or every issue
#[instrument(skip(config))]
fn run_validate(config: &AppConfig) -> Result<()> {
    match Catalog::load(&config.catalog_source(), config.normalizer()) {
        Ok(catalog) => {
            println!(
                "Catalog OK: {} elements, {} recipes, {} impossible combinations",
                catalog.len(),
                catalog.recipe_count(),
                catalog.impossible_count()
            );
            Ok(())
        }
        Err(CatalogError::Inconsistent { issues }) => {
            for issue in &issues {
                eprintln!("- {}", issue);
            }
            bail!("Catalog has {} issue(s)", issues.len())
        }
        Err(e) => Err(e.into()),
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Logs to stderr; stdout stays free for command output and bot replies.
fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Logs to a file so the terminal screen stays clean.
fn init_file_tracing(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let log_file = std::fs::File::create(dir.join(TUI_LOG_FILE))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}
