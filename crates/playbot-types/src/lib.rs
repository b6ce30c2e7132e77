//! Shared types for the playbot crates.
//!
//! Currently this is the configuration surface: [`BotConfig`] is loaded
//! once at startup and passed (immutably) to the transport and the
//! command layer.

pub mod config;

pub use config::{BotConfig, ConfigError};
