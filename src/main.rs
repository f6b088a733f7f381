//! userboard binary entry point.
//!
//! Parses options, sets up file logging, starts the one background load,
//! then runs the TUI event loop and restores the terminal on exit.
//!
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{error, info};

use userboard::app::{self, AppState, Keymap, Theme};
use userboard::cli::{Cli, init_logging, validate_endpoint};
use userboard::error::{Context, Result};
use userboard::remote::HttpUserSource;
use userboard::store::UserStore;

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Program entry point: run the TUI and report any top-level error to stderr.
fn main() -> Result<()> {
    let cli = Cli::parse();
    validate_endpoint(&cli.endpoint)?;
    init_logging(&cli)?;
    info!(endpoint = %cli.endpoint, "starting userboard");

    let source = HttpUserSource::new(cli.endpoint.clone())
        .with_ctx(|| format!("build HTTP client for {}", cli.endpoint))?;
    let mut store = UserStore::new();
    let pending = store.spawn_fetch(source);
    let state = AppState::new(
        store,
        pending,
        Theme::load_or_init(&cli.theme),
        Keymap::load_or_init(&cli.keybinds),
    );

    let mut terminal = init_terminal().map_err(|e| format!("init terminal: {}", e))?;

    let res = app::run(&mut terminal, state);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        error!(error = %err, "application error");
        eprintln!("application error: {err}");
    }
    Ok(())
}
