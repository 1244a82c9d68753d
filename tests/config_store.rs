use serde_json::{json, Value};
use tempfile::tempdir;

use electros::config_store::{ConfigStore, Settings};
use electros::error::StoreError;

fn settings(value: Value) -> Settings {
    value.as_object().cloned().unwrap()
}

#[test]
fn missing_files_read_as_empty() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join(".elemento"));

    assert!(matches!(store.load_settings(), Err(StoreError::NotFound(_))));
    assert!(matches!(store.load_hosts(), Err(StoreError::NotFound(_))));

    let (config, hosts) = store.read();
    assert!(config.is_empty());
    assert!(hosts.is_empty());
}

#[test]
fn malformed_settings_fall_back_to_empty() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    std::fs::write(store.settings_path(), "{bad").unwrap();
    std::fs::write(store.hosts_path(), "a.example\nb.example").unwrap();

    assert!(matches!(store.load_settings(), Err(StoreError::Parse { .. })));
    let (config, hosts) = store.read();
    assert!(config.is_empty());
    assert_eq!(hosts, vec!["a.example", "b.example"]);

    std::fs::write(store.settings_path(), "[1, 2]").unwrap();
    assert!(matches!(store.load_settings(), Err(StoreError::Parse { .. })));
}

#[test]
fn write_then_read_round_trips() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("nested").join(".elemento"));
    let config = settings(json!({"theme": "dark", "limits": {"cpu": 4}, "flags": [1, 2]}));
    let hosts = vec!["h1".to_string(), "h2".to_string(), "h3".to_string()];

    store.write(&config, &hosts).unwrap();

    let raw = std::fs::read_to_string(store.settings_path()).unwrap();
    assert!(raw.contains("\n    \"theme\": \"dark\""));
    assert_eq!(std::fs::read_to_string(store.hosts_path()).unwrap(), "h1\nh2\nh3");
    assert!(!store.settings_path().with_extension("tmp").exists());

    let (read_config, read_hosts) = store.read();
    assert_eq!(read_config, config);
    assert_eq!(read_hosts, hosts);
}

#[test]
fn empty_update_leaves_store_unchanged() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    let config = settings(json!({"a": 1}));
    let hosts = vec!["h2".to_string(), "h1".to_string()];
    store.write(&config, &hosts).unwrap();

    store.update(Settings::new(), Vec::new()).unwrap();

    let (read_config, read_hosts) = store.read();
    assert_eq!(read_config, config);
    assert_eq!(read_hosts, hosts);
}

#[test]
fn repeated_update_overwrites_keys_without_duplicating_hosts() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    store
        .write(&settings(json!({"a": 0, "b": {"x": 1}})), &["h0".to_string()])
        .unwrap();

    store
        .update(settings(json!({"a": 1, "b": {"y": 2}})), vec!["h1".to_string()])
        .unwrap();
    store
        .update(settings(json!({"a": 2})), vec!["h1".to_string()])
        .unwrap();

    let (config, hosts) = store.read();
    assert_eq!(Value::Object(config), json!({"a": 2, "b": {"y": 2}}));
    assert_eq!(hosts, vec!["h0", "h1"]);
}

#[test]
fn update_starts_from_empty_when_nothing_is_stored() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("fresh"));
    store
        .update(settings(json!({"a": 1})), vec!["h1".to_string(), "h1".to_string()])
        .unwrap();
    let (config, hosts) = store.read();
    assert_eq!(Value::Object(config), json!({"a": 1}));
    assert_eq!(hosts, vec!["h1"]);
}

#[test]
fn failed_write_keeps_previous_contents() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    store
        .write(&settings(json!({"keep": true})), &["old".to_string()])
        .unwrap();

    // A directory where the hosts temp file should go makes that write fail.
    std::fs::create_dir(store.hosts_path().with_extension("tmp")).unwrap();
    let err = store
        .write(&settings(json!({"keep": false})), &["new".to_string()])
        .unwrap_err();
    assert_eq!(err.path(), &store.hosts_path());

    let (config, hosts) = store.read();
    assert_eq!(Value::Object(config), json!({"keep": true}));
    assert_eq!(hosts, vec!["old"]);
    assert!(!store.settings_path().with_extension("tmp").exists());
}

#[test]
fn unreadable_hosts_fall_back_to_empty() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path());
    std::fs::write(store.settings_path(), r#"{"a": 1}"#).unwrap();
    // A directory in place of the hosts file cannot be read as text.
    std::fs::create_dir(store.hosts_path()).unwrap();

    assert!(matches!(store.load_hosts(), Err(StoreError::Io { .. })));
    let (config, hosts) = store.read();
    assert_eq!(Value::Object(config), json!({"a": 1}));
    assert!(hosts.is_empty());
}

#[test]
fn single_artifact_writes_leave_the_other_file_alone() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join(".elemento"));
    store
        .write(&settings(json!({"a": 1})), &["h1".to_string()])
        .unwrap();

    store.write_settings(&settings(json!({"b": 2}))).unwrap();
    let (config, hosts) = store.read();
    assert_eq!(Value::Object(config), json!({"b": 2}));
    assert_eq!(hosts, vec!["h1"]);

    store
        .write_hosts(&["h2".to_string(), "h3".to_string()])
        .unwrap();
    let (config, hosts) = store.read();
    assert_eq!(Value::Object(config), json!({"b": 2}));
    assert_eq!(hosts, vec!["h2", "h3"]);
    assert!(!store.hosts_path().with_extension("tmp").exists());
}

#[test]
fn single_artifact_write_creates_the_directory() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("fresh"));
    store.write_hosts(&["h1".to_string()]).unwrap();
    assert_eq!(std::fs::read_to_string(store.hosts_path()).unwrap(), "h1");
    assert!(matches!(store.load_settings(), Err(StoreError::NotFound(_))));
}
