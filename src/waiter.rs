//! Protocol-level reply correlation.
//!
//! A [`ReplyWaiter`] lets an outbound request block until a matching
//! inbound reply (or a terminating reply) arrives, while still routing
//! every message - including the one being waited for - through the
//! normal dispatch path. The wait is observational, not exclusive.
//!
//! There is no timeout: a server that never sends a matching or killing
//! reply blocks the session, matching the protocol contract of the
//! operations built on top. Callers that need a bound apply one outside
//! (e.g. `tokio::time::timeout`).

use tracing::trace;

use ursa_proto::Message;

use crate::dispatcher::Context;
use crate::error::ClientError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WaitState {
    Waiting,
    Matched,
    Killed,
}

/// A synchronous wait for correlated server replies.
///
/// Because the wait consumes the session's read path directly, only one
/// may be active at a time. Starting a second wait while one is pumping
/// (e.g. a user command issuing a join from inside a dispatch that a
/// wait triggered) fails with [`ClientError::WaitInProgress`].
pub struct ReplyWaiter<'c, 'a> {
    ctx: &'c mut Context<'a>,
    state: WaitState,
    collected: Vec<Message>,
}

impl<'c, 'a> ReplyWaiter<'c, 'a> {
    /// Create a waiter over the session's dispatch context.
    pub fn new(ctx: &'c mut Context<'a>) -> Self {
        Self {
            ctx,
            state: WaitState::Waiting,
            collected: Vec::new(),
        }
    }

    /// Pump messages until the wait terminates, returning the collected
    /// sequence.
    ///
    /// For each inbound message, after normal dispatch:
    /// - command in `matches`: collect it; with an empty `kills` set the
    ///   first match terminates the wait and is the sole result;
    /// - command in `kills`: terminate, with the killing message as the
    ///   final element of the result;
    /// - anything else: keep waiting.
    pub async fn wait(
        mut self,
        matches: &[&str],
        kills: &[&str],
    ) -> Result<Vec<Message>, ClientError> {
        if self.ctx.session.waiting {
            return Err(ClientError::WaitInProgress);
        }
        self.ctx.session.waiting = true;
        let result = self.pump(matches, kills).await;
        self.ctx.session.waiting = false;
        result.map(|()| self.collected)
    }

    async fn pump(&mut self, matches: &[&str], kills: &[&str]) -> Result<(), ClientError> {
        while self.state == WaitState::Waiting {
            let msg = self
                .ctx
                .session
                .read()
                .await?
                .ok_or(ClientError::ConnectionClosed)?;

            // Every message still goes through the normal dispatch path,
            // the awaited ones included.
            self.ctx.dispatch(&msg).await;

            if matches.contains(&msg.command.as_str()) {
                let terminal = kills.is_empty();
                trace!(command = %msg.command, "reply matched");
                self.collected.push(msg);
                if terminal {
                    self.state = WaitState::Matched;
                }
            } else if kills.contains(&msg.command.as_str()) {
                trace!(command = %msg.command, "wait terminated");
                self.collected.push(msg);
                self.state = WaitState::Killed;
            }
        }
        Ok(())
    }
}
