//! First-Aid Buddy TUI Entry Point
//!
//! Usage:
//!   first-aid-buddy [OPTIONS]
//!
//! Options:
//!   --api-url <URL>      Guidance service base URL (env: BUDDY_API_URL)
//!   --region <REGION>    UK, US or EU
//!   --timeout-secs <N>   Request timeout, 0 disables
//!   --config <PATH>      Config file (default: ~/.config/first-aid-buddy/config.toml)
//!   --log-file <PATH>    Log file (default: <cache dir>/first-aid-buddy/tui.log)

use std::fs::{self, File};
use std::io::{self, IsTerminal};
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use buddy_conductor::{load_config_from_path, ConfigOverrides, Region};
use buddy_tui::App;

/// Terminal client for the First-Aid Buddy guidance service
#[derive(Parser, Debug)]
#[command(name = "first-aid-buddy", version, about)]
struct Args {
    /// Guidance service base URL
    #[arg(long, env = "BUDDY_API_URL")]
    api_url: Option<String>,

    /// Emergency-number region (UK, US or EU)
    #[arg(long)]
    region: Option<Region>,

    /// Request timeout in seconds (0 disables)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn default_log_file() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("first-aid-buddy")
        .join("tui.log")
}

/// Log to a file; stdout belongs to the terminal UI
fn init_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_file = args.log_file.clone().unwrap_or_else(default_log_file);
    init_logging(&log_file)?;

    let mut config = load_config_from_path(args.config.clone())?;
    let mut overrides = ConfigOverrides::new();
    if let Some(url) = args.api_url {
        overrides = overrides.with_api_url(url);
    }
    if let Some(region) = args.region {
        overrides = overrides.with_region(region);
    }
    if let Some(secs) = args.timeout_secs {
        overrides = overrides.with_timeout_secs(secs);
    }
    overrides.apply(&mut config)?;
    tracing::info!(
        source = %config.source(),
        base_url = %config.backend.base_url,
        region = %config.conductor.default_region,
        "Configuration loaded"
    );

    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: first-aid-buddy requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means stdin or stdout is piped, or SSH ran without -t.");
        std::process::exit(1);
    }

    let mut app = App::new(&config)?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
