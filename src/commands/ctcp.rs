//! Replies to standard CTCP requests.
//!
//! CTCP payloads arrive inside PRIVMSG trailing text wrapped in the
//! `\x01` marker. ACTION is display-only and ignored here; the rest are
//! answered with NOTICE replies wrapped in the same marker. DCC is
//! declined.

use chrono::Local;
use tracing::debug;

use ursa_proto::{Message, CTCP_MARKER};

use crate::dispatcher::Context;
use crate::error::HandlerResult;

const VERSION_REPLY: &str = concat!("ursabot ", env!("CARGO_PKG_VERSION"));
const SOURCE_REPLY: &str = "https://github.com/ursabot/ursabot";
const USERINFO_REPLY: &str = "I'm a cybernetic bear";

/// CTCP commands answered, with the descriptions CLIENTINFO reports.
const CLIENTINFO: &[(&str, &str)] = &[
    ("PING", "<data> - Returns CTCP PING with data."),
    ("VERSION", "No arguments - Returns the bot's version."),
    ("SOURCE", "No arguments - Returns the bot's source repository."),
    ("TIME", "No arguments - Returns the local time of the bot's host."),
    ("CLIENTINFO", "No arguments - Returns this list."),
    ("USERINFO", "No arguments - Returns an arbitrary reply."),
    ("FINGER", "No arguments - FINGER is deprecated."),
];

/// Answer one CTCP request carried in PRIVMSG content.
pub async fn respond(ctx: &mut Context<'_>, msg: &Message, content: &str) -> HandlerResult {
    let Some(nick) = msg.nick() else {
        return Ok(());
    };
    let payload = content.trim_matches(CTCP_MARKER);

    // ACTION is presentation, not a request.
    if payload.starts_with("ACTION") {
        return Ok(());
    }

    let (command, _args) = payload.split_once(' ').unwrap_or((payload, ""));
    debug!(from = %nick, command = %command, "ctcp request");

    match command {
        // PING echoes the full request back, data included.
        "PING" => ctx.session.notice(nick, content).await,
        "VERSION" => ctcp_notice(ctx, nick, "VERSION", VERSION_REPLY).await,
        "SOURCE" => ctcp_notice(ctx, nick, "SOURCE", SOURCE_REPLY).await,
        "TIME" => {
            let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            ctcp_notice(ctx, nick, "TIME", &now).await
        }
        "CLIENTINFO" => {
            for (name, description) in CLIENTINFO {
                let line = format!("[{}] {}", name, description);
                ctcp_notice(ctx, nick, "CLIENTINFO", &line).await?;
            }
            Ok(())
        }
        "USERINFO" => ctcp_notice(ctx, nick, "USERINFO", USERINFO_REPLY).await,
        "FINGER" => ctcp_notice(ctx, nick, "FINGER", "Deprecated. Use USERINFO.").await,
        cmd if cmd.contains("DCC") => {
            let text = format!(
                "{}ERRMSG {} - DCC is unsupported currently.{}",
                CTCP_MARKER, payload, CTCP_MARKER
            );
            ctx.session.notice(nick, &text).await
        }
        _ => {
            let text = format!(
                "{}ERRMSG {} - Invalid CTCP command. Check CLIENTINFO for valid commands.{}",
                CTCP_MARKER, payload, CTCP_MARKER
            );
            ctx.session.notice(nick, &text).await
        }
    }
}

async fn ctcp_notice(
    ctx: &mut Context<'_>,
    nick: &str,
    command: &str,
    text: &str,
) -> HandlerResult {
    let wrapped = format!("{}{} {}{}", CTCP_MARKER, command, text, CTCP_MARKER);
    ctx.session.notice(nick, &wrapped).await
}
