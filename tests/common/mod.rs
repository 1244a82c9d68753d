#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use electros::config_store::ConfigStore;
use electros::daemon::AppState;
use electros::interfaces::probe::Probe;
use electros::status::{FirstObservation, StatusTracker};

/// Answers probes from a fixed script; `false` once the script runs out.
pub struct ScriptedProbe {
    results: Mutex<VecDeque<bool>>,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    pub fn new(results: Vec<bool>) -> Self {
        Self {
            results: Mutex::new(VecDeque::from(results)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn is_reachable(&self, _url: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results.lock().await.pop_front().unwrap_or(false)
    }
}

pub fn make_state(dir: &Path, probe: Arc<dyn Probe>) -> AppState {
    AppState {
        store: Arc::new(ConfigStore::new(dir)),
        tracker: Arc::new(StatusTracker::new(probe, FirstObservation::Notify)),
        page: "electros.html".to_string(),
        web_root: None,
    }
}
