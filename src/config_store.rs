//! On-disk settings and host list.
//!
//! Both artifacts live in one directory (`<home>/.elemento` by default):
//! `settings` is a JSON object written with 4-space indentation, `hosts` is
//! plain text with one host per line.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::error::{ElectrosError, Result, StoreError};
use crate::merge::{merge_settings, union_hosts};

pub type Settings = Map<String, Value>;
pub type Hosts = Vec<String>;

pub const CONFIG_DIR_NAME: &str = ".elemento";
pub const SETTINGS_FILE: &str = "settings";
pub const HOSTS_FILE: &str = "hosts";

pub fn ensure_dir(path: &Path) -> std::result::Result<(), StoreError> {
    fs::create_dir_all(path).map_err(|e| StoreError::io(path, e))
}

pub fn parse_hosts(content: &str) -> Hosts {
    content.lines().map(str::to_string).collect()
}

pub fn render_hosts(hosts: &[String]) -> String {
    hosts.join("\n")
}

pub fn render_settings(settings: &Settings) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    settings.serialize(&mut serializer)?;
    Ok(out)
}

#[derive(Debug)]
pub struct ConfigStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            ElectrosError::Config("unable to resolve the home directory".to_string())
        })?;
        Ok(Self::new(home.join(CONFIG_DIR_NAME)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    pub fn hosts_path(&self) -> PathBuf {
        self.dir.join(HOSTS_FILE)
    }

    pub fn load_settings(&self) -> std::result::Result<Settings, StoreError> {
        let path = self.settings_path();
        let content = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::Parse {
                path,
                message: "expected a JSON object".to_string(),
            }),
            Err(e) => Err(StoreError::Parse {
                path,
                message: e.to_string(),
            }),
        }
    }

    pub fn load_hosts(&self) -> std::result::Result<Hosts, StoreError> {
        let path = self.hosts_path();
        let content = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        Ok(parse_hosts(&content))
    }

    /// Reads both artifacts, falling back to empty values on any failure.
    pub fn read(&self) -> (Settings, Hosts) {
        let settings = self.load_settings().unwrap_or_else(|err| {
            log_read_failure(&err);
            Settings::new()
        });
        let hosts = self.load_hosts().unwrap_or_else(|err| {
            log_read_failure(&err);
            Hosts::new()
        });
        (settings, hosts)
    }

    /// Replaces both artifacts.
    ///
    /// Each file goes through a sibling `.tmp` file. Both temp files are
    /// written before anything is renamed, so a failure to produce either one
    /// leaves the previous contents of both artifacts in place.
    pub fn write(&self, settings: &Settings, hosts: &[String]) -> std::result::Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        self.write_locked(settings, hosts)
    }

    /// Replaces only the settings file, leaving the host list alone.
    pub fn write_settings(&self, settings: &Settings) -> std::result::Result<(), StoreError> {
        let path = self.settings_path();
        let rendered = render_settings(settings).map_err(|e| StoreError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        ensure_dir(&self.dir)?;
        replace_file(&path, &rendered)
    }

    /// Replaces only the hosts file, leaving the settings alone.
    pub fn write_hosts(&self, hosts: &[String]) -> std::result::Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        ensure_dir(&self.dir)?;
        replace_file(&self.hosts_path(), render_hosts(hosts).as_bytes())
    }

    /// Overlays `config_updates` and unions `hosts_updates` into the stored
    /// configuration, then writes the result.
    pub fn update(
        &self,
        config_updates: Settings,
        hosts_updates: Hosts,
    ) -> std::result::Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let (settings, hosts) = self.read();
        let settings = merge_settings(settings, config_updates);
        let hosts = union_hosts(hosts, hosts_updates);
        info!(
            keys = settings.len(),
            hosts = hosts.len(),
            "merged configuration updates"
        );
        self.write_locked(&settings, &hosts)
    }

    fn write_locked(&self, settings: &Settings, hosts: &[String]) -> std::result::Result<(), StoreError> {
        ensure_dir(&self.dir)?;
        let settings_path = self.settings_path();
        let hosts_path = self.hosts_path();
        let settings_tmp = settings_path.with_extension("tmp");
        let hosts_tmp = hosts_path.with_extension("tmp");

        let rendered = render_settings(settings).map_err(|e| StoreError::Parse {
            path: settings_path.clone(),
            message: e.to_string(),
        })?;
        if let Err(e) = fs::write(&settings_tmp, rendered) {
            let _ = fs::remove_file(&settings_tmp);
            return Err(StoreError::io(&settings_path, e));
        }
        if let Err(e) = fs::write(&hosts_tmp, render_hosts(hosts)) {
            let _ = fs::remove_file(&settings_tmp);
            let _ = fs::remove_file(&hosts_tmp);
            return Err(StoreError::io(&hosts_path, e));
        }

        // A failed second rename leaves the new settings next to the old hosts.
        if let Err(e) = fs::rename(&settings_tmp, &settings_path) {
            let _ = fs::remove_file(&settings_tmp);
            let _ = fs::remove_file(&hosts_tmp);
            return Err(StoreError::io(&settings_path, e));
        }
        if let Err(e) = fs::rename(&hosts_tmp, &hosts_path) {
            let _ = fs::remove_file(&hosts_tmp);
            return Err(StoreError::io(&hosts_path, e));
        }
        debug!(dir = %self.dir.display(), "configuration written");
        Ok(())
    }
}

fn replace_file(path: &Path, content: &[u8]) -> std::result::Result<(), StoreError> {
    let tmp = path.with_extension("tmp");
    if let Err(e) = fs::write(&tmp, content) {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::io(path, e));
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::io(path, e));
    }
    debug!(path = %path.display(), "file replaced");
    Ok(())
}

fn log_read_failure(err: &StoreError) {
    match err {
        StoreError::NotFound(path) => debug!("{} does not exist yet", path.display()),
        StoreError::Parse { path, message } => {
            error!("Error: Invalid JSON in {}: {message}", path.display())
        }
        StoreError::Io { path, message } => {
            error!("Error: Unable to read {}: {message}", path.display())
        }
    }
}
