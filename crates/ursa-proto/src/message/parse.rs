//! Message parsing implementation.
//!
//! This module implements `FromStr` for `Message`. Parsing performs the
//! base prefix/command/params split first, then populates command-specific
//! derived fields for recognized verbs and numerics.

use std::str::FromStr;

use crate::error::{MessageParseError, ProtocolError};
use crate::origin::Origin;

use super::types::{Kind, Message, WhoReply};

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let raw = s.trim_end_matches(&['\r', '\n'][..]);
        parse_line(raw).map_err(|cause| ProtocolError::InvalidMessage {
            string: raw.to_owned(),
            cause,
        })
    }
}

fn parse_line(raw: &str) -> Result<Message, MessageParseError> {
    if raw.is_empty() {
        return Err(MessageParseError::EmptyMessage);
    }

    // Base split: *<prefix> <command> <params>
    let (origin, rest) = match raw.strip_prefix(':') {
        Some(prefixed) => {
            let (token, rest) = prefixed
                .split_once(' ')
                .ok_or(MessageParseError::MissingCommand)?;
            (Some(Origin::parse(token)?), rest)
        }
        None => (None, raw),
    };

    let (command, params) = rest
        .split_once(' ')
        .ok_or(MessageParseError::MissingCommand)?;
    if command.is_empty() {
        return Err(MessageParseError::MissingCommand);
    }

    // Params split: <middle> :<trailing>
    let (middle, trailing) = match params.split_once(':') {
        Some((middle, trailing)) => (middle, trailing),
        None => (params, ""),
    };
    let middle = middle.trim_end().to_owned();
    let trailing = trailing.to_owned();

    // Derived fields come strictly after the base split.
    let kind = derive_kind(command, &middle, &trailing)?;

    Ok(Message {
        raw: raw.to_owned(),
        origin,
        command: command.to_owned(),
        params: params.to_owned(),
        middle,
        trailing,
        kind,
    })
}

/// Populate command-specific fields for recognized verbs and numerics.
///
/// Assumes the base fields are already split out; unrecognized commands
/// keep `Kind::Other`.
fn derive_kind(command: &str, middle: &str, trailing: &str) -> Result<Kind, MessageParseError> {
    Ok(match command {
        "PRIVMSG" => Kind::Privmsg {
            source: middle.to_owned(),
            content: trailing.to_owned(),
        },
        "NOTICE" => Kind::Notice {
            source: middle.to_owned(),
            content: trailing.to_owned(),
        },
        "PING" => Kind::Ping {
            token: trailing.to_owned(),
        },
        "JOIN" => Kind::Join {
            channel: middle.to_owned(),
        },
        "PART" => Kind::Part {
            channel: middle.to_owned(),
        },
        "NICK" => Kind::Nick {
            new_nick: trailing.to_owned(),
        },
        "QUIT" => Kind::Quit {
            message: trailing.to_owned(),
        },
        "352" => Kind::WhoReply(parse_who_reply(middle, trailing)?),
        "315" => {
            let fields: Vec<&str> = middle.split_whitespace().collect();
            if fields.len() != 2 {
                return Err(MessageParseError::NotEnoughArguments {
                    expected: 2,
                    got: fields.len(),
                });
            }
            Kind::EndOfWho {
                source: fields[0].to_owned(),
                target: fields[1].to_owned(),
                content: trailing.to_owned(),
            }
        }
        "372" | "375" | "376" => Kind::Motd {
            source: middle.to_owned(),
            content: trailing.to_owned(),
        },
        _ => Kind::Other,
    })
}

/// Parse the positional fields of a `352` WHO reply.
///
/// Wire shape: `<source> <channel> <user> <host> <server> <nick> <flags>
/// :<hopcount> <realname>`. Field count mismatches are parse errors.
fn parse_who_reply(middle: &str, trailing: &str) -> Result<WhoReply, MessageParseError> {
    let fields: Vec<&str> = middle.split_whitespace().collect();
    if fields.len() != 7 {
        return Err(MessageParseError::NotEnoughArguments {
            expected: 7,
            got: fields.len(),
        });
    }

    let (hopcount, realname) =
        trailing
            .split_once(' ')
            .ok_or(MessageParseError::NotEnoughArguments {
                expected: 2,
                got: usize::from(!trailing.is_empty()),
            })?;

    Ok(WhoReply {
        source: fields[0].to_owned(),
        channel: fields[1].to_owned(),
        user: fields[2].to_owned(),
        host: fields[3].to_owned(),
        server: fields[4].to_owned(),
        nick: fields[5].to_owned(),
        flags: fields[6].to_owned(),
        hopcount: hopcount.to_owned(),
        realname: realname.to_owned(),
    })
}
