//! # ursa-proto
//!
//! Line framing and message parsing for a single-connection IRC client,
//! following the message grammar of RFC 2812.
//!
//! ## Features
//!
//! - CR-LF line framing with partial-line buffering across reads
//! - Message parsing into origin, command, and parameter fields
//! - Command-specific derived fields for the client's recognized verbs
//! - Tokio codec integration for framed transports
//!
//! ## Quick Start
//!
//! ```rust
//! use ursa_proto::{Kind, Message};
//!
//! let msg: Message = ":nick!user@host PRIVMSG #den :hello there".parse().unwrap();
//! assert_eq!(msg.command, "PRIVMSG");
//! match &msg.kind {
//!     Kind::Privmsg { source, content } => {
//!         assert_eq!(source, "#den");
//!         assert_eq!(content, "hello there");
//!     }
//!     other => panic!("expected Privmsg, got {other:?}"),
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod irc;
pub mod line;
pub mod message;
pub mod origin;

pub use self::error::{MessageParseError, ProtocolError};
pub use self::irc::IrcCodec;
pub use self::line::LineCodec;
pub use self::message::{Kind, Message, WhoReply};
pub use self::origin::Origin;

/// Maximum length of a single IRC line in bytes, per RFC 2812.
pub const MAX_LINE_LEN: usize = 512;

/// Shortest line worth handing to the parser.
///
/// Fragments of this many bytes or fewer are stream noise and are dropped
/// by the codec rather than reported as parse failures.
pub const MIN_LINE_LEN: usize = 3;

/// CTCP delimiter byte, used for ACTION and other CTCP payloads.
pub const CTCP_MARKER: char = '\u{1}';
