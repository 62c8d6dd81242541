//! LayerSpeed Settings Crate
//!
//! Handles the speed change configuration: typed settings, the declarative
//! settings schema shown by hosts, and JSON/TOML persistence.

pub mod config;
pub mod error;

pub use config::{SettingValue, SpeedChangeSettings};
pub use error::{SettingsError, SettingsResult};
