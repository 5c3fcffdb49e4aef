//! ursabot - a single-connection IRC client/bot.
//!
//! The core is a triad: [`Session`] owns the socket and the connection
//! identity, the dispatcher routes every decoded message to registered
//! handlers, and [`ReplyWaiter`] lets an outbound request block for its
//! correlated server reply while normal dispatch continues. Around that
//! sit two collaborators the built-in PRIVMSG handler routes to: the
//! user-command table and the passive chatter module.

pub mod chatter;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod session;
pub mod waiter;

pub use self::chatter::Chatter;
pub use self::commands::{CommandContext, CommandRequest, CommandTable, Guard, UserCommand};
pub use self::config::{Config, ConfigError};
pub use self::dispatcher::{Client, Context, Handler, HandlerRegistry};
pub use self::error::{ClientError, HandlerResult};
pub use self::session::Session;
pub use self::waiter::ReplyWaiter;
