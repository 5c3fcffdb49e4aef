//! Error types for the protocol library.
//!
//! Framing and I/O failures are [`ProtocolError`]; a line that framed
//! cleanly but does not parse is [`ProtocolError::InvalidMessage`] wrapping
//! a [`MessageParseError`] describing the cause.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid UTF-8 bytes in a framed line.
    #[error("invalid UTF-8 in line at byte {byte_pos}: {details}")]
    InvalidUtf8 {
        /// Byte position where UTF-8 validation failed.
        byte_pos: usize,
        /// Detailed error message from the UTF-8 decoder.
        details: String,
    },

    /// Line exceeded the maximum allowed length.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    LineTooLong {
        /// Actual line length.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Failed to parse a framed line into a message.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The line that failed to parse.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when parsing a line into a message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Line was empty.
    #[error("empty message")]
    EmptyMessage,

    /// The mandatory prefix/command/params split could not be performed.
    #[error("missing command or parameters")]
    MissingCommand,

    /// Origin contained `!` but no `@`, so the user/host split failed.
    #[error("invalid origin: {0}")]
    InvalidOrigin(String),

    /// A recognized command's positional fields failed the arity check.
    #[error("not enough arguments: expected {expected}, got {got}")]
    NotEnoughArguments {
        /// Expected number of fields.
        expected: usize,
        /// Actual number of fields.
        got: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::LineTooLong {
            actual: 1024,
            limit: 512,
        };
        assert_eq!(format!("{}", err), "line too long: 1024 bytes (limit: 512)");

        let err = MessageParseError::NotEnoughArguments {
            expected: 7,
            got: 4,
        };
        assert_eq!(format!("{}", err), "not enough arguments: expected 7, got 4");
    }

    #[test]
    fn test_error_source_chaining() {
        let parse_err = MessageParseError::MissingCommand;
        let protocol_err = ProtocolError::InvalidMessage {
            string: ":prefix".to_string(),
            cause: parse_err.clone(),
        };

        let source = std::error::Error::source(&protocol_err);
        assert!(source.is_some());
        assert_eq!(source.unwrap().to_string(), parse_err.to_string());
    }
}
