//! Message origin types.
//!
//! The optional leading `:sender` portion of a protocol line identifies its
//! source. A user origin has the shape `nick!user@host`; server-originated
//! lines carry a bare server name with none of those components.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format

use crate::error::MessageParseError;

/// The origin of a message, taken from its leading prefix.
///
/// `nick`, `user`, and `host` are populated only when the prefix matches
/// the `nick!user@host` shape. Their absence is legal and must not be
/// assumed away downstream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Origin {
    /// The raw prefix with the leading `:` stripped.
    pub raw: String,
    /// Nickname, if the prefix is a user mask.
    pub nick: Option<String>,
    /// Username (ident), if the prefix is a user mask.
    pub user: Option<String>,
    /// Hostname, if the prefix is a user mask.
    pub host: Option<String>,
}

impl Origin {
    /// Parse a prefix string (without the leading `:`).
    ///
    /// A prefix containing `!` must also contain `@`; anything else is a
    /// plain server or service name and keeps only `raw`.
    pub fn parse(s: &str) -> Result<Self, MessageParseError> {
        match s.split_once('!') {
            Some((nick, user_host)) => {
                let (user, host) = user_host
                    .split_once('@')
                    .ok_or_else(|| MessageParseError::InvalidOrigin(s.to_owned()))?;
                Ok(Origin {
                    raw: s.to_owned(),
                    nick: Some(nick.to_owned()),
                    user: Some(user.to_owned()),
                    host: Some(host.to_owned()),
                })
            }
            None => Ok(Origin {
                raw: s.to_owned(),
                nick: None,
                user: None,
                host: None,
            }),
        }
    }

    /// The `user@host` portion of a user mask, if present.
    pub fn user_host(&self) -> Option<String> {
        match (&self.user, &self.host) {
            (Some(user), Some(host)) => Some(format!("{}@{}", user, host)),
            _ => None,
        }
    }

    /// True when this origin has the full `nick!user@host` shape.
    pub fn is_user(&self) -> bool {
        self.nick.is_some()
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_mask() {
        let o = Origin::parse("nick!user@host.example.com").unwrap();
        assert_eq!(o.nick.as_deref(), Some("nick"));
        assert_eq!(o.user.as_deref(), Some("user"));
        assert_eq!(o.host.as_deref(), Some("host.example.com"));
        assert!(o.is_user());
        assert_eq!(o.user_host().unwrap(), "user@host.example.com");
    }

    #[test]
    fn test_parse_server_name() {
        let o = Origin::parse("irc.example.com").unwrap();
        assert_eq!(o.raw, "irc.example.com");
        assert!(o.nick.is_none());
        assert!(o.user.is_none());
        assert!(o.host.is_none());
        assert!(!o.is_user());
    }

    #[test]
    fn test_bang_without_at_is_invalid() {
        let err = Origin::parse("nick!userhost").unwrap_err();
        assert!(matches!(err, MessageParseError::InvalidOrigin(_)));
    }
}
