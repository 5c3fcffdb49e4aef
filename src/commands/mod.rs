//! User commands: requests parsed out of PRIVMSG content.
//!
//! A user command is `<prefix><root> <args...>` sent by an IRC user. The
//! [`CommandTable`] is an explicit registry built at startup; each entry
//! couples a handler with a chain of [`Guard`]s that validate the request
//! before the handler runs. Handlers see a [`CommandContext`] - the
//! session operations plus the triggering message - never the session's
//! raw fields.

pub mod ctcp;
mod misc;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use ursa_proto::{Kind, Message};

use crate::chatter::Chatter;
use crate::dispatcher::Context;
use crate::error::{ClientError, HandlerResult};

/// A parsed user command: root plus optional arguments.
///
/// `args` is `None` when no tokens follow the root, mirroring how the
/// guards distinguish "no arguments" from "empty argument".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandRequest {
    /// First whitespace-separated token after the prefix.
    pub root: String,
    /// Remaining tokens, absent if there are none.
    pub args: Option<Vec<String>>,
}

impl CommandRequest {
    /// Parse message content into a request.
    ///
    /// Returns `None` when the content is not a command attempt (wrong
    /// prefix, or nothing after the prefix).
    pub fn parse(content: &str, prefix: char) -> Option<Self> {
        let body = content.strip_prefix(prefix)?;
        let mut tokens = body.split_whitespace();
        let root = tokens.next()?.to_owned();
        let args: Vec<String> = tokens.map(str::to_owned).collect();
        Some(CommandRequest {
            root,
            args: if args.is_empty() { None } else { Some(args) },
        })
    }

    /// Number of arguments present.
    pub fn arg_count(&self) -> usize {
        self.args.as_ref().map_or(0, Vec::len)
    }

    /// The arguments joined back into one string, if any are present.
    pub fn joined_args(&self) -> Option<String> {
        self.args.as_ref().map(|args| args.join(" "))
    }
}

/// Validation applied to a request before its handler runs.
///
/// Guards compose as a chain; the first violation stops the command and
/// produces the user-facing message instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Guard {
    /// The command accepts no arguments.
    NoArgs,
    /// The command requires exactly one argument.
    OneArg,
    /// The command requires one or more arguments.
    RequiresArgs,
    /// The command may only be run by the configured owner.
    OwnerOnly,
}

impl Guard {
    /// Check a request against this guard.
    pub fn check(&self, request: &CommandRequest, sender: Option<&str>, owner: &str) -> Result<(), GuardViolation> {
        match self {
            Guard::NoArgs if request.args.is_some() => Err(GuardViolation::UnexpectedArgs),
            Guard::OneArg if request.arg_count() != 1 => Err(GuardViolation::NotOneArg),
            Guard::RequiresArgs if request.args.is_none() => Err(GuardViolation::MissingArgs),
            Guard::OwnerOnly if sender != Some(owner) => Err(GuardViolation::NotAuthorized),
            _ => Ok(()),
        }
    }
}

/// A structured validation failure, rendered to the user verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardViolation {
    /// Arguments given to a command that takes none.
    UnexpectedArgs,
    /// Not exactly one argument.
    NotOneArg,
    /// Arguments missing.
    MissingArgs,
    /// Sender is not the owner.
    NotAuthorized,
}

impl std::fmt::Display for GuardViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            GuardViolation::UnexpectedArgs => "Invalid entry. This command accepts no arguments.",
            GuardViolation::NotOneArg => "Invalid entry. This command requires one argument.",
            GuardViolation::MissingArgs => "Invalid entry. This command requires arguments.",
            GuardViolation::NotAuthorized => "You do not have permission to run this command.",
        };
        f.write_str(text)
    }
}

/// Trait implemented by all user commands.
#[async_trait]
pub trait UserCommand: Send + Sync {
    /// Run the command against its request context.
    async fn run(&self, cc: &mut CommandContext<'_, '_>) -> HandlerResult;
}

/// One registered command: guard chain, handler, and help text.
pub struct CommandEntry {
    guards: Vec<Guard>,
    handler: Arc<dyn UserCommand>,
    help: &'static str,
}

impl CommandEntry {
    /// The guard chain, in application order.
    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    /// Help text shown by the `help` command.
    pub fn help(&self) -> &'static str {
        self.help
    }
}

/// Registry of user commands keyed by root.
#[derive(Default)]
pub struct CommandTable {
    entries: BTreeMap<String, CommandEntry>,
}

impl CommandTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with the stock command set registered.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        misc::register(&mut table);
        table
    }

    /// Register a command under a root.
    pub fn register(
        &mut self,
        root: &str,
        guards: Vec<Guard>,
        help: &'static str,
        handler: Arc<dyn UserCommand>,
    ) {
        self.entries.insert(
            root.to_owned(),
            CommandEntry {
                guards,
                handler,
                help,
            },
        );
    }

    /// Look up a command by root.
    pub fn get(&self, root: &str) -> Option<&CommandEntry> {
        self.entries.get(root)
    }

    /// All registered roots, sorted.
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Request context handed to command handlers.
///
/// Exposes `reply`/`notice` addressed at the requester, the triggering
/// message, and pass-through access to the session operations - but not
/// the session's fields.
pub struct CommandContext<'c, 'a> {
    ctx: &'c mut Context<'a>,
    /// The PRIVMSG that carried the command.
    pub msg: &'c Message,
    /// The parsed request.
    pub request: &'c CommandRequest,
}

impl<'c, 'a> CommandContext<'c, 'a> {
    /// The target the triggering message was addressed to (channel or
    /// our own nick for a private message).
    pub fn source(&self) -> &str {
        match &self.msg.kind {
            Kind::Privmsg { source, .. } => source,
            _ => &self.msg.middle,
        }
    }

    /// Nick of the requester, when known.
    pub fn nick(&self) -> Option<&str> {
        self.msg.nick()
    }

    /// The configured owner nick.
    pub fn owner(&self) -> &str {
        &self.ctx.session.owner
    }

    /// The current command prefix.
    pub fn cmd_prefix(&self) -> char {
        self.ctx.session.cmd_prefix
    }

    /// The command table (for help listings).
    pub fn commands(&self) -> &'a CommandTable {
        self.ctx.commands
    }

    /// The passive-trigger collaborator.
    pub fn chatter(&self) -> &'a Mutex<Chatter> {
        self.ctx.chatter
    }

    /// Reply to the command's source (channel or query).
    pub async fn reply(&mut self, text: &str) -> Result<(), ClientError> {
        let source = self.source().to_owned();
        self.ctx.session.say(&source, text).await
    }

    /// Send a NOTICE back to the requester.
    pub async fn notice(&mut self, text: &str) -> Result<(), ClientError> {
        let Some(nick) = self.nick().map(str::to_owned) else {
            return Ok(());
        };
        self.ctx.session.notice(&nick, text).await
    }

    /// Send one raw line.
    pub async fn send(&mut self, line: &str) -> Result<(), ClientError> {
        self.ctx.session.send(line).await
    }

    /// Send a PRIVMSG to an arbitrary target.
    pub async fn say(&mut self, target: &str, text: &str) -> Result<(), ClientError> {
        self.ctx.session.say(target, text).await
    }

    /// Send a NOTICE to an arbitrary target.
    pub async fn notice_to(&mut self, target: &str, text: &str) -> Result<(), ClientError> {
        self.ctx.session.notice(target, text).await
    }

    /// Perform a `/me` action at a target.
    pub async fn action(&mut self, target: &str, text: &str) -> Result<(), ClientError> {
        self.ctx.session.action(target, text).await
    }

    /// Join channels, returning the failure replies.
    pub async fn join(&mut self, channels: &[String]) -> Result<Vec<Message>, ClientError> {
        self.ctx.join(channels).await
    }

    /// Part channels.
    pub async fn part(&mut self, channels: &[String], message: &str) -> Result<(), ClientError> {
        self.ctx.session.part(channels, message).await
    }

    /// Run a WHO query and collect the reply rows.
    pub async fn who(&mut self, target: &str) -> Result<Vec<Message>, ClientError> {
        self.ctx.who(target).await
    }

    /// Run a NAMES query and collect the reply rows.
    pub async fn names(&mut self, target: &str) -> Result<Vec<Message>, ClientError> {
        self.ctx.names(target).await
    }

    /// Disconnect from the server.
    pub async fn quit(&mut self, message: &str) -> Result<(), ClientError> {
        self.ctx.session.quit(message).await
    }

    /// Current flood-control spacing.
    pub fn msg_delay(&self) -> Duration {
        self.ctx.session.msg_delay()
    }

    /// Change the flood-control spacing; false if out of range.
    pub fn set_msg_delay(&mut self, delay: Duration) -> bool {
        self.ctx.session.set_msg_delay(delay)
    }

    /// Change the command prefix.
    pub fn set_cmd_prefix(&mut self, prefix: char) {
        self.ctx.session.set_cmd_prefix(prefix)
    }

    async fn deliver_violation(&mut self, violation: GuardViolation) -> Result<(), ClientError> {
        match violation {
            GuardViolation::NotAuthorized => self.notice(&violation.to_string()).await,
            _ => self.reply(&violation.to_string()).await,
        }
    }
}

/// Parse and run a user command out of PRIVMSG content.
///
/// Returns false when the content was not a command attempt at all
/// (nothing after the prefix), so the caller can offer it to the
/// passive-trigger collaborator instead. Guard violations and handler
/// errors are delivered/logged here and still count as handled.
pub async fn dispatch(ctx: &mut Context<'_>, msg: &Message, content: &str) -> bool {
    let Some(request) = CommandRequest::parse(content, ctx.session.cmd_prefix) else {
        return false;
    };

    let commands = ctx.commands;
    let Some(entry) = commands.get(&request.root) else {
        debug!(root = %request.root, "unknown user command");
        return true;
    };

    let owner = ctx.session.owner.clone();
    let mut cc = CommandContext {
        ctx,
        msg,
        request: &request,
    };

    for guard in entry.guards() {
        if let Err(violation) = guard.check(&request, msg.nick(), &owner) {
            debug!(root = %request.root, violation = ?violation, "command rejected");
            if let Err(e) = cc.deliver_violation(violation).await {
                error!(root = %request.root, error = %e, "failed to deliver rejection");
            }
            return true;
        }
    }

    if let Err(e) = entry.handler.run(&mut cc).await {
        error!(root = %request.root, error = %e, "user command failed");
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(root: &str, args: &[&str]) -> CommandRequest {
        CommandRequest {
            root: root.to_owned(),
            args: if args.is_empty() {
                None
            } else {
                Some(args.iter().map(|s| s.to_string()).collect())
            },
        }
    }

    #[test]
    fn test_parse_root_and_args() {
        let req = CommandRequest::parse(".quit Bye everyone!", '.').unwrap();
        assert_eq!(req.root, "quit");
        assert_eq!(req.args, Some(vec!["Bye".to_owned(), "everyone!".to_owned()]));
        assert_eq!(req.joined_args().unwrap(), "Bye everyone!");
    }

    #[test]
    fn test_parse_root_without_args() {
        let req = CommandRequest::parse(".bots", '.').unwrap();
        assert_eq!(req.root, "bots");
        assert_eq!(req.args, None);
        assert_eq!(req.arg_count(), 0);
    }

    #[test]
    fn test_parse_rejects_non_commands() {
        assert_eq!(CommandRequest::parse("hello there", '.'), None);
        assert_eq!(CommandRequest::parse(".", '.'), None);
        assert_eq!(CommandRequest::parse("!bots", '.'), None);
    }

    #[test]
    fn test_no_args_guard() {
        assert!(Guard::NoArgs.check(&request("bots", &[]), None, "o").is_ok());
        assert_eq!(
            Guard::NoArgs.check(&request("bots", &["x"]), None, "o"),
            Err(GuardViolation::UnexpectedArgs)
        );
    }

    #[test]
    fn test_one_arg_guard() {
        assert!(Guard::OneArg.check(&request("who", &["crono"]), None, "o").is_ok());
        assert_eq!(
            Guard::OneArg.check(&request("who", &[]), None, "o"),
            Err(GuardViolation::NotOneArg)
        );
        assert_eq!(
            Guard::OneArg.check(&request("who", &["a", "b"]), None, "o"),
            Err(GuardViolation::NotOneArg)
        );
    }

    #[test]
    fn test_requires_args_guard() {
        assert!(Guard::RequiresArgs.check(&request("say", &["#a", "hi"]), None, "o").is_ok());
        assert_eq!(
            Guard::RequiresArgs.check(&request("say", &[]), None, "o"),
            Err(GuardViolation::MissingArgs)
        );
    }

    #[test]
    fn test_owner_guard() {
        assert!(Guard::OwnerOnly.check(&request("quit", &[]), Some("Garcia"), "Garcia").is_ok());
        assert_eq!(
            Guard::OwnerOnly.check(&request("quit", &[]), Some("Impostor"), "Garcia"),
            Err(GuardViolation::NotAuthorized)
        );
        assert_eq!(
            Guard::OwnerOnly.check(&request("quit", &[]), None, "Garcia"),
            Err(GuardViolation::NotAuthorized)
        );
    }

    #[test]
    fn test_guard_chain_order() {
        // Owner check first, then arity - the chain stops at the first
        // violation.
        let guards = [Guard::OwnerOnly, Guard::RequiresArgs];
        let req = request("join", &[]);
        let first = guards
            .iter()
            .find_map(|g| g.check(&req, Some("Garcia"), "Garcia").err());
        assert_eq!(first, Some(GuardViolation::MissingArgs));
    }

    #[test]
    fn test_builtin_table_roots() {
        let table = CommandTable::builtin();
        for root in ["help", "bots", "quit", "join", "who", "rps", "chatter"] {
            assert!(table.get(root).is_some(), "missing command {root}");
        }
        // Roots come back sorted for the help listing.
        let roots: Vec<&str> = table.roots().collect();
        let mut sorted = roots.clone();
        sorted.sort_unstable();
        assert_eq!(roots, sorted);
    }
}
