//! Bot configuration.
//!
//! [`BotConfig`] is the top-level configuration loaded from `config.toml`,
//! controlling the IRC connection (server, nick, SASL credentials, TLS),
//! the channels to join, and the command prefix. Loaded once at startup;
//! immutable for the process lifetime.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors from loading or parsing the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level bot configuration, loaded from TOML.
///
/// `nick`, `user` and `server` are required; everything else has a
/// default. `server` is a `host:port` pair (e.g. `"irc.libera.chat:6697"`).
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BotConfig {
    /// Nickname to register with.
    pub nick: String,
    /// Username for the USER command.
    pub user: String,
    /// Real-name field for the USER command. Falls back to `nick` when empty.
    #[serde(default)]
    pub real_name: String,
    /// SASL account name. SASL is attempted only when both `sasl_user`
    /// and `sasl_password` are non-empty.
    #[serde(default)]
    pub sasl_user: String,
    /// SASL password. This value is sensitive and must never be logged.
    #[serde(default)]
    pub sasl_password: String,
    /// Server address as `host:port`.
    pub server: String,
    /// Whether to wrap the connection in TLS.
    #[serde(default)]
    pub use_tls: bool,
    /// Literal prefix that addresses a command to the bot (e.g. `"~eval"`).
    #[serde(default = "default_prefix")]
    pub command_prefix: String,
    /// Channels to join (in order) once the server accepts registration.
    #[serde(default)]
    pub join_channels: Vec<String>,
    /// Raise the default log filter to `debug` when `RUST_LOG` is unset.
    #[serde(default)]
    pub debug: bool,
}

fn default_prefix() -> String {
    "~".to_string()
}

impl BotConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load the configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    /// Whether SASL authentication should be attempted.
    pub fn use_sasl(&self) -> bool {
        !self.sasl_user.is_empty() && !self.sasl_password.is_empty()
    }

    /// Real-name to register with, falling back to the nick when unset.
    pub fn effective_real_name(&self) -> &str {
        if self.real_name.is_empty() {
            &self.nick
        } else {
            &self.real_name
        }
    }
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("nick", &self.nick)
            .field("user", &self.user)
            .field("real_name", &self.real_name)
            .field("sasl_user", &self.sasl_user)
            .field("sasl_password", &"[REDACTED]")
            .field("server", &self.server)
            .field("use_tls", &self.use_tls)
            .field("command_prefix", &self.command_prefix)
            .field("join_channels", &self.join_channels)
            .field("debug", &self.debug)
            .finish()
    }
}
