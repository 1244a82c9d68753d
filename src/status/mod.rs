//! Reachability tracking with change notifications.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use tracing::info;

use crate::interfaces::probe::Probe;

/// What to do the first time a URL is observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FirstObservation {
    /// Any first observation counts as a transition.
    #[default]
    Notify,
    /// Only a first `inaccessible` result counts; a first `accessible` is stored silently.
    NotifyIfInaccessible,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub url: String,
    pub previous: Option<bool>,
    pub accessible: bool,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.accessible {
            "accessible"
        } else {
            "inaccessible"
        };
        write!(f, "Service status changed for {}: {state}", self.url)
    }
}

/// Last observed reachability per URL. Starts empty and lives as long as its owner.
#[derive(Debug, Default)]
pub struct StatusCache {
    last: HashMap<String, bool>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<bool> {
        self.last.get(url).copied()
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }

    pub fn snapshot(&self) -> BTreeMap<String, bool> {
        self.last
            .iter()
            .map(|(url, accessible)| (url.clone(), *accessible))
            .collect()
    }

    /// Stores `accessible` for `url` and reports whether that is a transition.
    /// An unchanged value leaves the cache untouched.
    pub fn record(
        &mut self,
        url: &str,
        accessible: bool,
        policy: FirstObservation,
    ) -> Option<Transition> {
        let previous = self.get(url);
        if previous == Some(accessible) {
            return None;
        }
        self.last.insert(url.to_string(), accessible);

        let notify = match (previous, policy) {
            (Some(_), _) => true,
            (None, FirstObservation::Notify) => true,
            (None, FirstObservation::NotifyIfInaccessible) => !accessible,
        };
        notify.then(|| Transition {
            url: url.to_string(),
            previous,
            accessible,
        })
    }
}

pub struct StatusTracker {
    probe: Arc<dyn Probe>,
    cache: Mutex<StatusCache>,
    policy: FirstObservation,
    events: broadcast::Sender<Transition>,
}

impl StatusTracker {
    pub fn new(probe: Arc<dyn Probe>, policy: FirstObservation) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            probe,
            cache: Mutex::new(StatusCache::new()),
            policy,
            events,
        }
    }

    pub fn policy(&self) -> FirstObservation {
        self.policy
    }

    /// Probes `url` and returns whether it answered 200.
    pub async fn check(&self, url: &str) -> bool {
        let accessible = self.probe.is_reachable(url).await;
        let transition = self.cache.lock().await.record(url, accessible, self.policy);
        if let Some(transition) = transition {
            info!("{transition}");
            // No subscribers is fine.
            let _ = self.events.send(transition);
        }
        accessible
    }

    pub async fn last_status(&self, url: &str) -> Option<bool> {
        self.cache.lock().await.get(url)
    }

    pub async fn snapshot(&self) -> BTreeMap<String, bool> {
        self.cache.lock().await.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Transition> {
        self.events.subscribe()
    }
}
