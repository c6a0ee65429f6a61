use std::path::PathBuf;

use anyhow::{Context, Result};
use draftpad_core::{create_generator, AssistSession, Config, Document};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

const LOG_FILE_PREFIX: &str = "draftpad.log";

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("draftpad")
        .join("logs")
}

/// Route tracing output to a daily log file. The terminal belongs to the UI,
/// so nothing is written to stdout or stderr.
fn init_logging() -> Result<WorkerGuard> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("DRAFTPAD_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

fn load_config() -> Config {
    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "could not load config, using defaults");
            Config::default()
        }
    };
    config.apply_env_overrides();
    config
}

async fn run(app: &mut App) -> Result<()> {
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event);
        app.poll_assist();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging()?;

    let config = load_config();
    let provider = config.provider();
    let generator = create_generator(&config)
        .with_context(|| format!("failed to set up the {} backend", provider.display_name()))?;

    let session = AssistSession::new(generator).with_timeout(config.request_timeout());
    let mut app = App::new(Document::new(), session);

    tracing::info!(
        provider = %provider,
        model = %app.session.generator().model(),
        key_source = config.key_source(provider).unwrap_or("none"),
        "starting draftpad"
    );

    tui::install_panic_hook();
    let result = run(&mut app).await;
    tui::restore()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "terminal loop failed");
    }
    result
}
