//! Trip Budget CLI - Plan trip budgets, convert currencies and explore destinations
//!
//! Runs one of the non-interactive subcommands, or the destination explorer
//! terminal UI for `tripbudget explore`.

use std::fs::OpenOptions;
use std::io;
use std::panic;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tripbudget::app::App;
use tripbudget::cli::{Cli, Command};
use tripbudget::commands::{self, Services};
use tripbudget::config::Config;
use tripbudget::data::{Region, TravelApi};
use tripbudget::explorer::Explorer;
use tripbudget::storage::Store;
use tripbudget::ui;

const LOG_FILE: &str = "tripbudget.log";

/// Logs to stderr, honouring `RUST_LOG` over the verbosity default
fn init_stderr_logging(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

/// Logs to a file in the data directory so output does not corrupt the TUI
fn init_file_logging(default_filter: &str, data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    let path = data_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .init();
    Ok(())
}

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

async fn run_explorer(api: TravelApi, region: Option<Region>) -> Result<()> {
    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(Explorer::new(api), region);

    // Main event loop
    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        // Fetches queued by the last key press run between frames; the
        // loading screen or stale list stays visible meanwhile
        if app.pending().is_some() {
            app.run_pending().await;
            continue;
        }

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let config = cli.apply_overrides(config);
    let store = Store::new(&config)
        .context("No data directory available; pass --data-dir or set TRIPBUDGET_DATA_DIR")?;

    match &cli.command {
        Command::Explore { .. } => init_file_logging(cli.log_filter(), store.dir())?,
        _ => init_stderr_logging(cli.log_filter()),
    }
    info!(data_dir = %store.dir().display(), "starting");
    debug!(
        timeout_secs = config.timeout_secs,
        photos_enabled = config.unsplash_access_key.is_some(),
        "configuration loaded"
    );

    let api = TravelApi::new(&config);

    match cli.command {
        Command::Explore { region } => run_explorer(api, region).await,
        command => {
            let services = Services::new(api, store);
            let mut stdout = io::stdout();
            commands::execute(command, &services, &mut stdout).await
        }
    }
}
