//! Message dispatch: the handler registry, the receive loop, and the
//! built-in handlers.
//!
//! The registry is an explicit object constructed at startup and passed
//! by reference into everything that dispatches - there is no
//! process-wide handler table. A command absent from the registry is
//! simply not dispatched; that is not an error.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{error, info, warn};

use ursa_proto::{Kind, Message, CTCP_MARKER};

use crate::chatter::Chatter;
use crate::commands::{self, CommandTable};
use crate::config::Config;
use crate::error::{ClientError, HandlerResult};
use crate::session::Session;
use crate::waiter::ReplyWaiter;

/// Numeric replies that settle a JOIN: `353` is the success signal, the
/// rest reject the channel.
const JOIN_REPLIES: &[&str] = &[
    "353", "403", "405", "407", "437", "461", "471", "473", "474", "475", "476", "479",
];
/// WHO rows and the numerics that end a WHO listing.
const WHO_MATCH: &[&str] = &["352"];
const WHO_KILL: &[&str] = &["315", "401", "403"];
/// NAMES rows and the numerics that end a NAMES listing.
const NAMES_MATCH: &[&str] = &["353"];
const NAMES_KILL: &[&str] = &["366", "402"];

/// Trait implemented by all message handlers.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle one inbound message.
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult;
}

/// Registry of message handlers keyed by command name.
///
/// Each command maps to an ordered sequence of handlers; insertion order
/// is call order.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Vec<Arc<dyn Handler>>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in handlers registered:
    /// PRIVMSG routing to the command/chatter collaborators, and
    /// PING/PONG echo.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("PRIVMSG", Arc::new(UserMessageHandler));
        registry.register("PING", Arc::new(PingHandler));
        registry
    }

    /// Append a handler for a command.
    pub fn register(&mut self, command: impl Into<String>, handler: Arc<dyn Handler>) {
        self.handlers.entry(command.into()).or_default().push(handler);
    }

    /// Dispatch a message to every handler registered for its command,
    /// in insertion order. A handler error is logged and does not stop
    /// delivery to the handlers after it.
    pub async fn dispatch(&self, ctx: &mut Context<'_>, msg: &Message) {
        let Some(handlers) = self.handlers.get(&msg.command) else {
            return;
        };
        for handler in handlers {
            if let Err(e) = handler.handle(ctx, msg).await {
                error!(command = %msg.command, error = %e, "handler failed");
            }
        }
    }
}

/// Mutable view handed to handlers: the session plus the collaborators
/// reachable from it.
///
/// Handlers get the session operations and the reply-correlated
/// composites (`join`, `who`, `names`); they never get the raw registry
/// map or each other.
pub struct Context<'a> {
    /// The live session.
    pub session: &'a mut Session,
    /// The registry dispatching this message (reply waits pump it).
    pub registry: &'a HandlerRegistry,
    /// User-command table collaborator.
    pub commands: &'a CommandTable,
    /// Passive-trigger collaborator.
    pub chatter: &'a Mutex<Chatter>,
}

impl Context<'_> {
    /// Route one message through the registry.
    pub async fn dispatch(&mut self, msg: &Message) {
        let registry = self.registry;
        registry.dispatch(self, msg).await;
    }

    /// Join channels, verifying each against the server's reply.
    ///
    /// For every channel a JOIN is sent and the reply wait terminates on
    /// `353` (success) or a join-failure numeric. Rejected channels are
    /// dropped from the pending list and their failure messages
    /// accumulated; the survivors are added to the session's channel
    /// set. The failure messages are the return value - a rejection is
    /// never an `Err`.
    pub async fn join(&mut self, channels: &[String]) -> Result<Vec<Message>, ClientError> {
        let mut failures = Vec::new();
        let mut joined = Vec::new();
        for channel in channels {
            let line = format!("JOIN {}", channel);
            self.session.send(&line).await?;
            let replies = ReplyWaiter::new(self).wait(&[], JOIN_REPLIES).await?;
            match replies.into_iter().next_back() {
                Some(reply) if reply.command == "353" => {
                    info!(channel = %channel, "joined");
                    joined.push(channel.clone());
                }
                Some(reply) => {
                    warn!(channel = %channel, code = %reply.command, "join rejected");
                    failures.push(reply);
                }
                None => {}
            }
        }
        self.session.channels.extend(joined);
        Ok(failures)
    }

    /// Send WHO and collect the `352` rows until the listing ends
    /// (`315`, or `401`/`403` for a bad target). The terminating message
    /// is the final element of the returned sequence.
    pub async fn who(&mut self, target: &str) -> Result<Vec<Message>, ClientError> {
        let line = format!("WHO {}", target);
        self.session.send(&line).await?;
        ReplyWaiter::new(self).wait(WHO_MATCH, WHO_KILL).await
    }

    /// Send NAMES and collect the `353` rows until the listing ends
    /// (`366`, or `402` for a bad target).
    pub async fn names(&mut self, target: &str) -> Result<Vec<Message>, ClientError> {
        let line = format!("NAMES {}", target);
        self.session.send(&line).await?;
        ReplyWaiter::new(self).wait(NAMES_MATCH, NAMES_KILL).await
    }
}

/// The client: one session, its registry, and the two collaborators the
/// core routes user messages to.
pub struct Client {
    /// The live session.
    pub session: Session,
    registry: HandlerRegistry,
    commands: CommandTable,
    chatter: Mutex<Chatter>,
}

impl Client {
    /// Connect and register, wiring up the built-in handlers and the
    /// default command table.
    pub async fn connect(config: &Config) -> Result<Self, ClientError> {
        let session = Session::connect(config).await?;
        Ok(Client {
            session,
            registry: HandlerRegistry::builtin(),
            commands: CommandTable::builtin(),
            chatter: Mutex::new(Chatter::from_config(config)),
        })
    }

    fn context(&mut self) -> Context<'_> {
        Context {
            session: &mut self.session,
            registry: &self.registry,
            commands: &self.commands,
            chatter: &self.chatter,
        }
    }

    /// Join channels, verifying each against the server's reply.
    /// See [`Context::join`].
    pub async fn join(&mut self, channels: &[String]) -> Result<Vec<Message>, ClientError> {
        self.context().join(channels).await
    }

    /// Send WHO for a target and collect the reply rows.
    pub async fn who(&mut self, target: &str) -> Result<Vec<Message>, ClientError> {
        self.context().who(target).await
    }

    /// Send NAMES for a target and collect the reply rows.
    pub async fn names(&mut self, target: &str) -> Result<Vec<Message>, ClientError> {
        self.context().names(target).await
    }

    /// The receive loop: read, decode, dispatch, until the session dies.
    ///
    /// Messages are processed in exactly the order the socket delivers
    /// them. A read failure is fatal; the server closing the connection
    /// ends the loop cleanly.
    pub async fn run(&mut self) -> Result<(), ClientError> {
        while self.session.alive {
            let msg = match self.session.read().await {
                Ok(Some(msg)) => msg,
                Ok(None) => {
                    info!("connection closed by server");
                    self.session.alive = false;
                    break;
                }
                Err(e) => {
                    self.session.alive = false;
                    return Err(e);
                }
            };
            self.context().dispatch(&msg).await;
        }
        Ok(())
    }
}

/// Built-in PING handler: echo the token back verbatim.
pub struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        if let Kind::Ping { token } = &msg.kind {
            let line = format!("PONG :{}", token);
            ctx.session.send(&line).await?;
        }
        Ok(())
    }
}

/// Built-in PRIVMSG handler.
///
/// CTCP requests are answered directly; content starting with the
/// configured command prefix is handed to the user-command collaborator;
/// everything else is offered to the passive-trigger collaborator.
pub struct UserMessageHandler;

#[async_trait]
impl Handler for UserMessageHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Kind::Privmsg { source, content } = &msg.kind else {
            return Ok(());
        };
        if content.is_empty() {
            return Ok(());
        }

        if content.starts_with(CTCP_MARKER) {
            return commands::ctcp::respond(ctx, msg, content).await;
        }

        if content.starts_with(ctx.session.cmd_prefix) {
            if commands::dispatch(ctx, msg, content).await {
                return Ok(());
            }
            // A lone prefix character is not a command; fall through to
            // the chatter collaborator like any other content.
        }

        let response = match ctx.chatter.lock() {
            Ok(chatter) => chatter.response(content).map(str::to_owned),
            Err(_) => None,
        };
        if let Some(response) = response {
            ctx.session.say(source, &response).await?;
        }
        Ok(())
    }
}
