//! Opens the front-end window pointed at the local service.
//!
//! Chromium-family browsers are started directly so the window can be sized,
//! put in kiosk/app mode and given the configured flags. Without one, the URL
//! goes to the system default browser.

use std::path::{Path, PathBuf};

use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::config::{WindowConfig, WindowMode};
use crate::error::{ElectrosError, Result};

const CHROMIUM_NAMES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
    "microsoft-edge",
    "msedge",
];

#[cfg(target_os = "macos")]
const WELL_KNOWN_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
];

#[cfg(target_os = "windows")]
const WELL_KNOWN_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const WELL_KNOWN_PATHS: &[&str] = &[];

/// The running front-end, if any.
#[derive(Debug)]
pub enum Window {
    /// A browser process we own; the app ends when it exits.
    Process(Child),
    /// Handed to the default browser; nothing to wait on.
    SystemBrowser,
    Headless,
}

impl Window {
    /// Resolves once the window is gone. Never resolves when there is no process to watch.
    pub async fn closed(self) {
        match self {
            Window::Process(mut child) => {
                if let Err(err) = child.wait().await {
                    warn!("lost track of the browser process: {err}");
                }
            }
            Window::SystemBrowser | Window::Headless => futures::future::pending::<()>().await,
        }
    }
}

pub fn chromium_args(window: &WindowConfig, url: &str, profile_dir: &Path) -> Vec<String> {
    let mut args = Vec::new();
    if window.mode == WindowMode::Kiosk {
        args.push("--kiosk".to_string());
    }
    args.push(format!("--app={url}"));
    args.push(format!("--window-size={},{}", window.width, window.height));
    args.push(format!("--user-data-dir={}", profile_dir.display()));
    args.extend(window.browser_args.iter().cloned());
    args
}

/// First file named like a Chromium browser in `dirs`.
pub fn find_in_dirs<I>(dirs: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    let dirs: Vec<PathBuf> = dirs.into_iter().collect();
    for name in CHROMIUM_NAMES {
        for dir in &dirs {
            for candidate in [dir.join(name), dir.join(format!("{name}.exe"))] {
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
    }
    None
}

pub fn find_browser() -> Option<PathBuf> {
    let from_path = std::env::var_os("PATH")
        .and_then(|paths| find_in_dirs(std::env::split_paths(&paths)));
    from_path.or_else(|| {
        WELL_KNOWN_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.is_file())
    })
}

fn profile_dir() -> PathBuf {
    std::env::temp_dir().join("electros-profile")
}

fn open_system_browser(url: &str) -> Result<Window> {
    webbrowser::open(url).map_err(|e| ElectrosError::Launch(e.to_string()))?;
    info!(%url, "opened in the default browser");
    Ok(Window::SystemBrowser)
}

pub fn launch(window: &WindowConfig, url: &str) -> Result<Window> {
    match window.mode {
        WindowMode::None => {
            info!(%url, "window disabled, serving only");
            Ok(Window::Headless)
        }
        WindowMode::Browser => open_system_browser(url),
        WindowMode::Kiosk | WindowMode::App => {
            let Some(browser) = window.browser.clone().or_else(find_browser) else {
                warn!("no Chromium-based browser found, falling back to the default browser");
                return open_system_browser(url);
            };
            let args = chromium_args(window, url, &profile_dir());
            let child = Command::new(&browser)
                .args(&args)
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| {
                    ElectrosError::Launch(format!("failed to start {}: {e}", browser.display()))
                })?;
            info!(browser = %browser.display(), mode = ?window.mode, "window launched");
            Ok(Window::Process(child))
        }
    }
}
