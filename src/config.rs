use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv6Addr};
use std::path::{Path, PathBuf};

use crate::error::{ElectrosError, Result};
use crate::status::FirstObservation;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8888;
pub const DEFAULT_PAGE: &str = "electros.html";
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// How the front-end window is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// Full-screen app window without browser chrome.
    Kiosk,
    /// Chromeless app window.
    App,
    /// Default system browser tab.
    Browser,
    /// Serve only, open nothing.
    None,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub mode: WindowMode,
    pub browser: Option<PathBuf>,
    pub browser_args: Vec<String>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            mode: WindowMode::Kiosk,
            browser: None,
            browser_args: vec![
                "--disable-gpu".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--disable-frame-rate-limit".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub page: String,
    /// Directory holding `settings` and `hosts`. `None` means `<home>/.elemento`.
    pub data_dir: Option<PathBuf>,
    /// Extra static files served next to the bundled page.
    pub web_root: Option<PathBuf>,
    pub probe_timeout_secs: u64,
    pub first_observation: FirstObservation,
    pub window: WindowConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            page: DEFAULT_PAGE.to_string(),
            data_dir: None,
            web_root: None,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            first_observation: FirstObservation::default(),
            window: WindowConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ElectrosError::Config(e.to_string()))?;
        let config: AppConfig =
            serde_json::from_str(&content).map_err(|e| ElectrosError::Config(e.to_string()))?;
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", bracketed(&self.host), self.port)
    }

    /// URL the window is pointed at.
    pub fn page_url(&self) -> String {
        let host = match self.host.trim_matches(|c: char| c == '[' || c == ']').parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) if ip.is_unspecified() => "localhost".to_string(),
            Ok(IpAddr::V6(ip)) if ip.is_unspecified() => "[::1]".to_string(),
            _ => bracketed(&self.host),
        };
        format!(
            "http://{host}:{}/{}",
            self.port,
            self.page.trim_start_matches('/')
        )
    }
}

/// IPv6 literals need brackets once a port is appended.
fn bracketed(host: &str) -> String {
    match host.parse::<Ipv6Addr>() {
        Ok(_) => format!("[{host}]"),
        Err(_) => host.to_string(),
    }
}
