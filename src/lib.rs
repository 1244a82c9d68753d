pub mod config;
pub mod config_store;
pub mod daemon;
pub mod error;
pub mod interfaces;
pub mod launcher;
pub mod merge;
pub mod services;
pub mod status;

pub use crate::config::AppConfig;
pub use crate::config_store::{ConfigStore, Hosts, Settings};
pub use crate::error::{ElectrosError, Result, StoreError};
pub use crate::status::{FirstObservation, StatusCache, StatusTracker, Transition};
