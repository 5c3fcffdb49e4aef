//! Configuration loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Connection parameters, supplied by the caller as a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server host name or address.
    pub host: String,
    /// Server port (default: 6667).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Nick of the bot's owner; gates owner-only commands.
    pub owner: String,
    /// Connection password, sent as PASS before registration (optional).
    pub password: Option<String>,
    /// Channels to join after registration.
    #[serde(default)]
    pub channels: Vec<String>,
    /// Username for the USER registration line.
    #[serde(default = "default_user_name")]
    pub user_name: String,
    /// Nickname to register with.
    #[serde(default = "default_nick")]
    pub nick: String,
    /// Real name for the USER registration line.
    #[serde(default = "default_real_name")]
    pub real_name: String,
    /// Single-character prefix that marks user commands.
    #[serde(default = "default_cmd_prefix")]
    pub cmd_prefix: char,
    /// Read buffer capacity in bytes.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Minimum spacing between consecutive outbound sends, in
    /// milliseconds (flood control).
    #[serde(default = "default_msg_delay_ms")]
    pub msg_delay_ms: u64,
    /// Optional `trigger:response` file for the passive chatter module.
    #[serde(default)]
    pub chatter_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// The flood-control spacing as a [`Duration`].
    pub fn msg_delay(&self) -> Duration {
        Duration::from_millis(self.msg_delay_ms)
    }
}

fn default_port() -> u16 {
    6667
}

fn default_user_name() -> String {
    "ursa".to_string()
}

fn default_nick() -> String {
    "Ursabot".to_string()
}

fn default_real_name() -> String {
    "An ursine IRC bot".to_string()
}

fn default_cmd_prefix() -> char {
    '.'
}

fn default_buffer_size() -> usize {
    3072
}

fn default_msg_delay_ms() -> u64 {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            host = "irc.example.net"
            owner = "Garcia"
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 6667);
        assert_eq!(config.nick, "Ursabot");
        assert_eq!(config.cmd_prefix, '.');
        assert_eq!(config.buffer_size, 3072);
        assert_eq!(config.msg_delay(), Duration::from_millis(500));
        assert!(config.password.is_none());
        assert!(config.channels.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config: Config = toml::from_str(
            r##"
            host = "irc.example.net"
            port = 6697
            owner = "Garcia"
            password = "hunter2"
            channels = ["#den", "#botparty"]
            user_name = "bear"
            nick = "Kuma"
            real_name = "A test bear"
            cmd_prefix = "!"
            buffer_size = 8192
            msg_delay_ms = 250
            "##,
        )
        .unwrap();

        assert_eq!(config.port, 6697);
        assert_eq!(config.password.as_deref(), Some("hunter2"));
        assert_eq!(config.channels, vec!["#den", "#botparty"]);
        assert_eq!(config.cmd_prefix, '!');
        assert_eq!(config.msg_delay(), Duration::from_millis(250));
    }
}
