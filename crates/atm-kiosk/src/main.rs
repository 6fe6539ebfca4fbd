//! ATM Kiosk TUI entry point

use std::fs::{self, OpenOptions};
use std::io;
use std::panic;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use atm_core::{FileLockoutStore, InMemoryGateway, Kiosk, KioskConfig, SystemClock};
use atm_kiosk::App;

#[tokio::main]
async fn main() -> Result<()> {
    // Set up panic hook to restore terminal on crash
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let config = match KioskConfig::default_path() {
        Some(path) => KioskConfig::load(&path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => KioskConfig::default(),
    };

    fs::create_dir_all(&config.storage_dir)
        .with_context(|| format!("creating {}", config.storage_dir.display()))?;

    // Log to a file so output never lands on the alternate screen
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_file())?;
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .with(
            EnvFilter::from_default_env()
                .add_directive("atm_kiosk=info".parse()?)
                .add_directive("atm_core=info".parse()?),
        )
        .init();

    let result = run_app(config).await;

    if let Err(e) = &result {
        tracing::error!("Application error: {}", e);
    }

    result
}

/// Main application runner
async fn run_app(config: KioskConfig) -> Result<()> {
    let gateway = Arc::new(
        InMemoryGateway::builder()
            .with_demo_accounts()
            .latency(config.gateway_latency())
            .build(),
    );
    let store = Box::new(FileLockoutStore::new(config.lockout_file()));
    let (kiosk, events) = Kiosk::new(config, gateway, store, Arc::new(SystemClock))?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(kiosk, events);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
