use std::io::stdout;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use teleview::infrastructure::{AppConfig, ArchiveClient, CliArgs, StorageManager};
use teleview::presentation::App;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

fn create_app() -> Result<(App, bool)> {
    let args = CliArgs::parse();
    let storage = match &args.config {
        Some(path) => StorageManager::with_dir(
            path.parent()
                .map(std::path::Path::to_path_buf)
                .unwrap_or_default(),
        ),
        None => StorageManager::new()?,
    };

    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);

    init_logging(&config)?;

    info!(version = teleview::VERSION, "Starting Teleview");

    let client = ArchiveClient::new(
        &config.archive.base_url,
        config.archive.token.clone(),
        config.archive.timeout(),
    )?;
    info!(base_url = %config.archive.base_url, groups = config.groups.len(), "Archive client ready");

    let app = App::new(
        Arc::new(client),
        config.history.to_loader_config(),
        config.group_ids(),
        config.ui.timestamp_format.clone(),
    )
    .with_storage(storage);

    Ok((app, config.mouse))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;

    let (app, mouse) = create_app()?;

    let mut terminal = ratatui::init();
    if mouse {
        execute!(stdout(), EnableMouseCapture)?;
    }

    let result = app.run(&mut terminal).await;

    if mouse {
        execute!(stdout(), DisableMouseCapture)?;
    }
    ratatui::restore();

    result
}
