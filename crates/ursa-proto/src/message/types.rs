//! Message type definitions.

use crate::origin::Origin;

/// One decoded protocol line.
///
/// The base fields (`origin`, `command`, `params`, `middle`, `trailing`)
/// are set for every message; `kind` carries command-specific derived
/// fields and is populated strictly after the base split. A message with
/// an unrecognized command has `Kind::Other` and only the base fields.
///
/// Messages are immutable once constructed and carry no identity beyond
/// their content.
///
/// # Example
///
/// ```
/// use ursa_proto::Message;
///
/// let msg: Message = "PING :42".parse().unwrap();
/// assert_eq!(msg.command, "PING");
/// assert_eq!(msg.trailing, "42");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// The raw line, terminator stripped.
    pub raw: String,
    /// Sender identity from the leading prefix, if any.
    pub origin: Option<Origin>,
    /// Command verb (e.g. `PRIVMSG`) or three-digit numeric reply code.
    ///
    /// Numeric codes are string-typed and compared as strings, never
    /// arithmetic.
    pub command: String,
    /// Everything after the command, unsplit.
    pub params: String,
    /// Parameters before the first `:` marker, trailing whitespace trimmed.
    pub middle: String,
    /// The trailing parameter; empty when no `:` marker is present.
    pub trailing: String,
    /// Command-specific derived fields.
    pub kind: Kind,
}

impl Message {
    /// Nickname of the sender, when the origin is a user mask.
    pub fn nick(&self) -> Option<&str> {
        self.origin.as_ref().and_then(|o| o.nick.as_deref())
    }

    /// The `user@host` of the sender, when the origin is a user mask.
    pub fn user_host(&self) -> Option<String> {
        self.origin.as_ref().and_then(|o| o.user_host())
    }
}

/// Command-specific derived fields.
///
/// Derivation functions may assume the base prefix/command/params fields
/// are already set and never re-derive them.
#[derive(Clone, Debug, PartialEq)]
pub enum Kind {
    /// `PRIVMSG` - a message to a user or channel.
    Privmsg {
        /// The target the message was addressed to.
        source: String,
        /// Message body.
        content: String,
    },
    /// `NOTICE` - a notice to a user or channel.
    Notice {
        /// The target the notice was addressed to.
        source: String,
        /// Notice body.
        content: String,
    },
    /// `PING` - server liveness probe.
    Ping {
        /// Token to echo back in the PONG reply.
        token: String,
    },
    /// `JOIN` - a user joined a channel.
    Join {
        /// Channel name.
        channel: String,
    },
    /// `PART` - a user left a channel.
    Part {
        /// Channel name.
        channel: String,
    },
    /// `NICK` - a user changed nickname.
    Nick {
        /// The new nickname.
        new_nick: String,
    },
    /// `QUIT` - a user disconnected.
    Quit {
        /// The quit message.
        message: String,
    },
    /// `352` (RPL_WHOREPLY) - one row of a WHO response.
    WhoReply(WhoReply),
    /// `315` (RPL_ENDOFWHO) - end-of-WHO marker.
    EndOfWho {
        /// The nick the reply was addressed to.
        source: String,
        /// The WHO target the listing was for.
        target: String,
        /// Marker text.
        content: String,
    },
    /// `372`/`375`/`376` - message-of-the-day text blocks.
    Motd {
        /// The nick the reply was addressed to.
        source: String,
        /// One line of MOTD text.
        content: String,
    },
    /// Any command without derived fields.
    Other,
}

/// Positional fields of a `352` WHO reply.
///
/// Wire shape: `<source> <channel> <user> <host> <server> <nick> <flags>
/// :<hopcount> <realname>`, where `source` is the nick the reply is
/// addressed to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhoReply {
    /// The nick the reply was addressed to.
    pub source: String,
    /// Channel the listed user shares with the target.
    pub channel: String,
    /// Username (ident) of the listed user.
    pub user: String,
    /// Host of the listed user.
    pub host: String,
    /// Server the listed user is connected to.
    pub server: String,
    /// Nickname of the listed user.
    pub nick: String,
    /// Presence flags (H/G, operator markers).
    pub flags: String,
    /// Hop count to the listed user.
    pub hopcount: String,
    /// Real name of the listed user.
    pub realname: String,
}
