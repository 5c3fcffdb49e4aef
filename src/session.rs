//! Connection session: socket ownership, identity, and outbound operations.
//!
//! A [`Session`] is one live connection. It owns the framed transport and
//! tracks the connection identity (nick, joined channels, registration
//! parameters). All outbound operations are thin wrappers that build a
//! command line, write it with CR-LF framing, and apply the configured
//! inter-message delay before returning.
//!
//! The session is single-threaded by design: reads, reply waits, and
//! handler execution all run on one logical task, so `channels` and `nick`
//! are mutated without locking. Suspension happens only at the socket read
//! and at the post-send flood-control sleep.

use std::collections::HashSet;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::sleep;
use tokio_util::codec::Framed;
use tracing::{debug, info};

use ursa_proto::{IrcCodec, Message, CTCP_MARKER, MAX_LINE_LEN};

use crate::config::Config;
use crate::error::ClientError;

/// Longest flood-control delay accepted by [`Session::set_msg_delay`].
const MAX_MSG_DELAY: Duration = Duration::from_secs(30);

/// One live connection to a server.
///
/// Created by [`Session::connect`], which opens the socket and performs
/// the registration handshake. Torn down by [`Session::quit`] or a fatal
/// read error; not reusable afterwards.
pub struct Session {
    framed: Framed<TcpStream, IrcCodec>,
    /// Server host this session is connected to.
    pub host: String,
    /// Server port this session is connected to.
    pub port: u16,
    /// Nick of the bot's owner.
    pub owner: String,
    /// The nick sent at registration.
    ///
    /// Not updated by [`Session::set_nick`]; see that method.
    pub nick: String,
    /// Username sent at registration.
    pub user_name: String,
    /// Real name sent at registration.
    pub real_name: String,
    /// Prefix character that marks user commands.
    pub cmd_prefix: char,
    /// Channels for which a join attempt received a positive server
    /// acknowledgement. A failed join never lands here.
    pub channels: HashSet<String>,
    /// Whether the session is still running.
    pub alive: bool,
    msg_delay: Duration,
    /// Set while a reply wait is pumping the read path; guards against
    /// nested waits.
    pub(crate) waiting: bool,
}

impl Session {
    /// Open the socket and perform the registration handshake:
    /// `PASS` (when configured), `NICK`, then `USER`.
    pub async fn connect(config: &Config) -> Result<Self, ClientError> {
        let stream = TcpStream::connect((config.host.as_str(), config.port))
            .await
            .map_err(ursa_proto::ProtocolError::from)?;
        let framed = Framed::with_capacity(
            stream,
            IrcCodec::with_max_len(MAX_LINE_LEN),
            config.buffer_size,
        );

        let mut session = Session {
            framed,
            host: config.host.clone(),
            port: config.port,
            owner: config.owner.clone(),
            nick: config.nick.clone(),
            user_name: config.user_name.clone(),
            real_name: config.real_name.clone(),
            cmd_prefix: config.cmd_prefix,
            channels: HashSet::new(),
            alive: true,
            msg_delay: config.msg_delay(),
            waiting: false,
        };
        session.register(config.password.as_deref()).await?;
        Ok(session)
    }

    async fn register(&mut self, password: Option<&str>) -> Result<(), ClientError> {
        if let Some(password) = password {
            let line = format!("PASS {}", password);
            self.send(&line).await?;
        }
        let line = format!("NICK {}", self.nick);
        self.send(&line).await?;
        let line = format!("USER {} 0 * :{}", self.user_name, self.real_name);
        self.send(&line).await?;
        info!(host = %self.host, port = self.port, nick = %self.nick, "registered");
        Ok(())
    }

    /// Write one complete line, then sleep the flood-control delay.
    pub async fn send(&mut self, line: &str) -> Result<(), ClientError> {
        self.framed.send(line.to_string()).await?;
        debug!(line = %line, "send");
        sleep(self.msg_delay).await;
        Ok(())
    }

    /// Read the next decoded message.
    ///
    /// Returns `Ok(None)` when the server closes the connection.
    /// Malformed lines never surface here - the codec logs and skips
    /// them - so an `Err` is a connection-level failure and fatal.
    pub async fn read(&mut self) -> Result<Option<Message>, ClientError> {
        match self.framed.next().await {
            Some(Ok(msg)) => {
                debug!(line = %msg.raw, "recv");
                Ok(Some(msg))
            }
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    async fn send_to(&mut self, command: &str, target: &str, text: &str) -> Result<(), ClientError> {
        let line = format!("{} {} :{}", command, target, text);
        self.send(&line).await
    }

    /// Send a PRIVMSG to a user or channel.
    pub async fn say(&mut self, target: &str, text: &str) -> Result<(), ClientError> {
        self.send_to("PRIVMSG", target, text).await
    }

    /// Send a NOTICE to a user or channel.
    pub async fn notice(&mut self, target: &str, text: &str) -> Result<(), ClientError> {
        self.send_to("NOTICE", target, text).await
    }

    /// Perform a `/me` action at the target.
    pub async fn action(&mut self, target: &str, text: &str) -> Result<(), ClientError> {
        let wrapped = format!("{}ACTION {}{}", CTCP_MARKER, text, CTCP_MARKER);
        self.say(target, &wrapped).await
    }

    /// Send QUIT and tear the session down.
    pub async fn quit(&mut self, message: &str) -> Result<(), ClientError> {
        let line = format!("QUIT :{}", message);
        self.send(&line).await?;
        self.alive = false;
        info!(message = %message, "quit");
        Ok(())
    }

    /// Request a nick change.
    ///
    /// Deliberately leaves `self.nick` unchanged: the server may reject
    /// the change, and updating local state would need a NICK
    /// confirmation listener.
    // TODO: register a NICK handler that updates `self.nick` when the
    // server confirms the change for our own mask.
    pub async fn set_nick(&mut self, nick: &str) -> Result<(), ClientError> {
        let line = format!("NICK {}", nick);
        self.send(&line).await
    }

    /// Part one or more channels, with an optional message, and drop
    /// them from the tracked set.
    pub async fn part(&mut self, channels: &[String], message: &str) -> Result<(), ClientError> {
        for channel in channels {
            let line = if message.is_empty() {
                format!("PART {}", channel)
            } else {
                format!("PART {} :{}", channel, message)
            };
            self.send(&line).await?;
            self.channels.remove(channel);
        }
        Ok(())
    }

    /// Current flood-control spacing.
    pub fn msg_delay(&self) -> Duration {
        self.msg_delay
    }

    /// Change the flood-control spacing. Values above 30 seconds are
    /// rejected.
    pub fn set_msg_delay(&mut self, delay: Duration) -> bool {
        if delay > MAX_MSG_DELAY {
            return false;
        }
        self.msg_delay = delay;
        info!(delay_ms = delay.as_millis() as u64, "message delay updated");
        true
    }

    /// Change the user-command prefix character.
    pub fn set_cmd_prefix(&mut self, prefix: char) {
        self.cmd_prefix = prefix;
    }
}
