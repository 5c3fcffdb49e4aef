//! Unified error handling for the client.
//!
//! Protocol rejections (join failures, unknown WHO targets) are never
//! errors here - they come back as normal reply messages from the
//! operations that requested them. This module covers what can actually
//! fail: the connection, and call-discipline violations.

use thiserror::Error;
use ursa_proto::ProtocolError;

/// Errors surfaced by session operations and the receive loop.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Socket connect/read/write failure, or an unrecoverable framing
    /// error. Fatal to the session when it happens inside the main loop.
    #[error("connection error: {0}")]
    Connection(#[from] ProtocolError),

    /// The server closed the connection while an operation was waiting
    /// on a reply.
    #[error("connection closed by server")]
    ConnectionClosed,

    /// A reply wait was started while another wait was still pumping.
    /// Only one wait may be active at a time; each reply-correlated
    /// operation must run its wait to completion before the next starts.
    #[error("a reply wait is already in progress")]
    WaitInProgress,
}

/// Result type for dispatched handlers.
///
/// Handler errors are caught at the dispatch boundary, logged with
/// context, and never stop delivery to later handlers or messages.
pub type HandlerResult = Result<(), ClientError>;
