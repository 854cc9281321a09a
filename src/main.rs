use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::HttpClient;
use crate::app::App;
use crate::config::KeyResolver;
use crate::controller::Controller;
use crate::session::{FileStorage, MemoryStorage, Storage};

mod api;
mod app;
mod cli;
pub mod commands;
mod config;
mod controller;
mod screen;
mod search;
mod session;
mod theme;
pub mod tui;
mod ui;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting lazyarticles");

    let args = cli::Args::parse();

    let config_path = args.config.clone().or_else(config::config_path);
    let mut config = config::load_from(config_path.as_deref())?;
    if let Some(base_url) = args.base_url {
        config.api.base_url = base_url;
    }
    if let Some(username) = args.username {
        config.last_username = Some(username);
    }

    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));
    let theme = theme::theme_from_name(&config.theme.name);

    let api = HttpClient::new(
        config.api.base_url.clone(),
        Duration::from_secs(config.api.timeout_secs),
    )?;
    info!("Using API at {}", api.base_url());
    let controller = Controller::new(Arc::new(api), open_storage());

    let mut app = App::new(controller, &config, config_path, resolver, theme);
    app.run().await?;

    Ok(())
}

/// File-backed token storage, or an in-memory one when the file is unusable.
fn open_storage() -> Box<dyn Storage> {
    let Some(path) = FileStorage::default_path() else {
        warn!("No data directory found, the session will not be kept");
        return Box::new(MemoryStorage::new());
    };
    match FileStorage::open(&path) {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            warn!("Failed to open storage at {:?}: {e}", path);
            Box::new(MemoryStorage::new())
        }
    }
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("lazyarticles").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "lazyarticles.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
