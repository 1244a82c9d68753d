use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use electros::config::{AppConfig, WindowMode};
use electros::daemon::{self, AppState};
use electros::error::Result;
use electros::launcher::{self, Window};
use electros::status::FirstObservation;

#[derive(Parser, Debug)]
#[command(name = "electros")]
#[command(about = "Electros desktop shell: local UI service and window")]
struct Cli {
    /// JSON file with application settings
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// Directory holding the `settings` and `hosts` files
    #[arg(long, env = "ELECTROS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[arg(long, value_enum)]
    mode: Option<WindowMode>,

    /// Chromium-based browser used for the window
    #[arg(long, env = "ELECTROS_BROWSER")]
    browser: Option<PathBuf>,

    /// Directory with extra static files for the UI
    #[arg(long)]
    web_root: Option<PathBuf>,

    #[arg(long, value_enum)]
    first_observation: Option<FirstObservation>,
}

impl Cli {
    fn into_config(self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = Some(dir);
        }
        if let Some(mode) = self.mode {
            config.window.mode = mode;
        }
        if let Some(browser) = self.browser {
            config.window.browser = Some(browser);
        }
        if let Some(root) = self.web_root {
            config.web_root = Some(root);
        }
        if let Some(policy) = self.first_observation {
            config.first_observation = policy;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,electros=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let config = Cli::parse().into_config()?;

    let state = AppState::from_config(&config)?;
    let listener = daemon::bind(&config).await?;

    let url = config.page_url();
    let window = launcher::launch(&config.window, &url).unwrap_or_else(|err| {
        error!("{err}");
        Window::Headless
    });

    let shutdown = async move {
        tokio::select! {
            _ = window.closed() => info!("window closed, shutting down"),
            _ = tokio::signal::ctrl_c() => info!("interrupted, shutting down"),
        }
    };

    daemon::serve(listener, state, shutdown).await
}
