//! IRC message codec for tokio.
//!
//! Wraps [`LineCodec`] and parses framed lines into [`Message`] values.
//! A line that fails to parse is logged and skipped so one malformed
//! message never terminates the stream or drops later lines from the
//! same read; fragments too short to be meaningful are dropped silently.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{trace, warn};

use crate::error;
use crate::line::LineCodec;
use crate::message::Message;

/// Tokio codec for decoding inbound [`Message`]s and encoding outbound
/// raw lines with CR-LF framing.
pub struct IrcCodec {
    inner: LineCodec,
}

impl IrcCodec {
    /// Create a new codec with the default line limit.
    pub fn new() -> Self {
        Self {
            inner: LineCodec::new(),
        }
    }

    /// Create a new codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
        }
    }

    /// Sanitize an outgoing line: truncate at the first embedded line
    /// ending and terminate with exactly one CR-LF.
    fn frame(mut line: String) -> String {
        if let Some(pos) = line.find(&['\r', '\n'][..]) {
            line.truncate(pos);
        }
        line.push_str("\r\n");
        line
    }
}

impl Default for IrcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Message>> {
        loop {
            match self.inner.decode(src) {
                Ok(Some(line)) => {
                    if line.len() <= crate::MIN_LINE_LEN {
                        trace!(line = %line, "dropping short fragment");
                        continue;
                    }
                    match line.parse::<Message>() {
                        Ok(msg) => return Ok(Some(msg)),
                        Err(e) => {
                            warn!(line = %line, error = %e, "skipping malformed line");
                            continue;
                        }
                    }
                }
                Ok(None) => return Ok(None),
                // The bad line is already consumed from the buffer, so the
                // stream stays decodable.
                Err(error::ProtocolError::InvalidUtf8 { byte_pos, details }) => {
                    warn!(byte_pos, details = %details, "skipping non-UTF-8 line");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Encoder<String> for IrcCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> error::Result<()> {
        self.inner.encode(Self::frame(msg), dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Kind;

    #[test]
    fn test_decode_message() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from("PING :serv\r\n");

        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.kind, Kind::Ping { token: "serv".to_owned() });
    }

    #[test]
    fn test_decode_skips_short_fragments() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from("ok\r\nPING :after\r\n");

        // The two-byte fragment is dropped; the next frame still decodes.
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, "PING");
    }

    #[test]
    fn test_decode_skips_malformed_line() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from(":prefix-only-no-command\r\nPING :after\r\n");

        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, "PING");
    }

    #[test]
    fn test_decode_trailing_empty_fragment() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from("PING :one\r\n\r\n");

        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, "PING");
        // Only the empty fragment remains; no frame, no error.
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_encode_frames_with_crlf() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::new();

        codec.encode("NICK Ursabot".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"NICK Ursabot\r\n");
    }

    #[test]
    fn test_encode_truncates_injected_newline() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::new();

        codec
            .encode("PRIVMSG #a :hi\r\nQUIT".to_string(), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"PRIVMSG #a :hi\r\n");
    }
}
