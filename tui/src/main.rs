//! Red Queen TUI Entry Point
//!
//! Usage:
//!   redqueen-tui [OPTIONS]
//!
//! Options:
//!   -c, --config <FILE>    Configuration file (default: ~/.config/red-queen/client.toml)
//!   --api-url <URL>        Chat backend base URL
//!   --data-dir <PATH>      Where chats and logs are stored
//!   --no-audio             Never play spoken replies
//!
//! Logs go to `redqueen-tui.log` in the data directory; set `RUST_LOG` to
//! change the level.

use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use redqueen_core::{
    load_config, load_config_from_path, AudioPlayer, ChatController, ClientConfig, ClockPlayer,
    CommandPlayer, ConfigOverrides, ControllerConfig, FileStore, HttpChatBackend, SessionStore,
};
use redqueen_tui::App;

/// Log file name inside the data directory
const LOG_FILE: &str = "redqueen-tui.log";

/// Red Queen - terminal chat client
#[derive(Parser, Debug)]
#[command(name = "redqueen-tui")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "REDQUEEN_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Chat backend base URL
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Directory for saved chats and logs
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Do not play spoken replies
    #[arg(long)]
    no_audio: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(url) = &self.api_url {
            overrides = overrides.with_base_url(url.clone());
        }
        if let Some(dir) = &self.data_dir {
            overrides = overrides.with_data_dir(dir.clone());
        }
        if self.no_audio {
            overrides = overrides.with_audio_enabled(false);
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config_from_path(Some(path.clone())),
        None => load_config(),
    }
    .context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    config.validate().context("Invalid configuration")?;

    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!("Failed to create data directory: {}", config.data_dir.display())
    })?;
    let _log_guard = init_logging(&config);

    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: redqueen-tui requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means stdin/stdout are piped, or SSH ran without -t.");
        std::process::exit(1);
    }

    let controller = build_controller(&config)?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let size = crossterm::terminal::size()?;
    let mut app = App::new(controller, size);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Some(goodbye) = app.goodbye() {
        println!("\n\x1b[31mRed Queen:\x1b[0m {goodbye}\n");
    }

    result
}

/// File logging; the terminal belongs to the alternate screen
fn init_logging(config: &ClientConfig) -> WorkerGuard {
    let appender = tracing_appender::rolling::never(&config.data_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!(
        source = %config.source(),
        base_url = %config.base_url,
        data_dir = %config.data_dir.display(),
        audio = config.audio_enabled,
        "Red Queen starting"
    );
    guard
}

fn build_controller(config: &ClientConfig) -> anyhow::Result<ChatController<HttpChatBackend>> {
    let kv = FileStore::open(&config.data_dir).context("Failed to open chat storage")?;
    let store = SessionStore::load(Box::new(kv));
    let backend = HttpChatBackend::from_config(config).context("Failed to build HTTP client")?;

    let player: Box<dyn AudioPlayer> = if config.audio_enabled && !config.audio_player.is_empty() {
        Box::new(CommandPlayer::new(
            config.audio_player.clone(),
            config.audio_cache_dir(),
        ))
    } else {
        Box::new(ClockPlayer::new())
    };

    Ok(ChatController::new(
        backend,
        store,
        player,
        ControllerConfig::from_client_config(config),
    ))
}
