//! Passive chatter: trigger words answered with canned responses.
//!
//! The dispatcher offers every non-command PRIVMSG here; an exact trigger
//! match answers back at the message's source. Triggers load from an
//! optional `trigger:response` lines file and the module starts disabled
//! until toggled on.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use tracing::{info, warn};

use crate::config::Config;

/// Trigger/response store for the passive-trigger collaborator.
#[derive(Debug, Default)]
pub struct Chatter {
    triggers: HashMap<String, String>,
    enabled: bool,
}

impl Chatter {
    /// An empty, disabled chatter store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration, loading the trigger file when one is
    /// set. A missing or unreadable file logs a warning and yields an
    /// empty store rather than failing startup.
    pub fn from_config(config: &Config) -> Self {
        let Some(path) = &config.chatter_file else {
            return Self::new();
        };
        match Self::load(path) {
            Ok(chatter) => {
                info!(path = %path.display(), triggers = chatter.triggers.len(), "chatter loaded");
                chatter
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load chatter file");
                Self::new()
            }
        }
    }

    /// Load triggers from a `trigger:response` lines file.
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_lines(content.lines()))
    }

    /// Build from `trigger:response` lines; malformed lines are skipped.
    pub fn from_lines<'l>(lines: impl Iterator<Item = &'l str>) -> Self {
        let triggers = lines
            .filter_map(|line| {
                let (trigger, response) = line.split_once(':')?;
                if trigger.is_empty() || response.is_empty() {
                    return None;
                }
                Some((trigger.to_owned(), response.to_owned()))
            })
            .collect();
        Self {
            triggers,
            enabled: false,
        }
    }

    /// The response for message content, when enabled and the content is
    /// an exact trigger match.
    pub fn response(&self, content: &str) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.triggers.get(content).map(String::as_str)
    }

    /// All known triggers.
    pub fn triggers(&self) -> impl Iterator<Item = &str> {
        self.triggers.keys().map(String::as_str)
    }

    /// Whether responses are currently produced.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Toggle response production.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lines_skips_malformed() {
        let chatter = Chatter::from_lines(
            [
                "hello:Oh hi!",
                "no separator here",
                ":empty trigger",
                "empty response:",
                "good bot:Thanks!",
            ]
            .into_iter(),
        );
        assert_eq!(chatter.triggers().count(), 2);
    }

    #[test]
    fn test_response_gated_by_enabled() {
        let mut chatter = Chatter::from_lines(["hello:Oh hi!"].into_iter());
        assert_eq!(chatter.response("hello"), None);

        chatter.set_enabled(true);
        assert_eq!(chatter.response("hello"), Some("Oh hi!"));
        assert_eq!(chatter.response("hello there"), None);
    }
}
