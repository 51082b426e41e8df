//! Configuration module for MOSDEX.
//!
//! Handles the settings file and the limits derived from it.

mod settings;

pub use settings::{LoggingSettings, ResolverSettings, Settings, SettingsError};
