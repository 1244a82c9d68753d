use std::collections::HashSet;

use crate::config_store::{Hosts, Settings};

/// Shallow overlay of `updates` onto `current`. Nested objects are replaced, not merged.
pub fn merge_settings(mut current: Settings, updates: Settings) -> Settings {
    for (key, value) in updates {
        current.insert(key, value);
    }
    current
}

/// Union of both host lists without duplicates, in order of first appearance.
pub fn union_hosts(current: Hosts, updates: Hosts) -> Hosts {
    let mut seen = HashSet::new();
    current
        .into_iter()
        .chain(updates)
        .filter(|host| seen.insert(host.clone()))
        .collect()
}
