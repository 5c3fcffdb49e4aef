//! Human-readable message rendering.
//!
//! Cosmetic only; dispatch never depends on these strings.

use std::fmt::{self, Display, Formatter};

use super::types::{Kind, Message};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Privmsg { source, content } => match self.nick() {
                Some(nick) => write!(f, "{} <{}> {}", source, nick, content),
                None => default_fmt(self, f),
            },
            Kind::Notice { content, .. } => match (self.nick(), self.user_host()) {
                (Some(nick), Some(uhost)) => {
                    write!(f, "{} ({}) - NOTICE - {}", nick, uhost, content)
                }
                _ => match &self.origin {
                    Some(origin) => write!(f, "{} - NOTICE - {}", origin, content),
                    None => default_fmt(self, f),
                },
            },
            Kind::Ping { token } => write!(f, "PING {}", token),
            Kind::Join { channel } => user_event(self, f, "has joined", channel, None),
            Kind::Part { channel } => user_event(self, f, "has left", channel, None),
            Kind::Quit { message } => user_event(self, f, "has quit", "", Some(message)),
            Kind::Nick { new_nick } => match self.nick() {
                Some(nick) => write!(f, "{} is now known as {}", nick, new_nick),
                None => default_fmt(self, f),
            },
            Kind::WhoReply(who) => write!(
                f,
                "{} {} {}@{} ({})",
                who.channel, who.nick, who.user, who.host, who.realname
            ),
            Kind::Motd { content, .. } => write!(f, "motd: {}", content),
            Kind::EndOfWho { .. } | Kind::Other => default_fmt(self, f),
        }
    }
}

fn user_event(
    msg: &Message,
    f: &mut Formatter<'_>,
    verb: &str,
    channel: &str,
    detail: Option<&str>,
) -> fmt::Result {
    let (Some(nick), Some(uhost)) = (msg.nick(), msg.user_host()) else {
        return default_fmt(msg, f);
    };
    write!(f, "{} ({}) {}", nick, uhost, verb)?;
    if !channel.is_empty() {
        write!(f, " {}", channel)?;
    }
    if let Some(detail) = detail {
        write!(f, " ({})", detail)?;
    }
    Ok(())
}

fn default_fmt(msg: &Message, f: &mut Formatter<'_>) -> fmt::Result {
    match &msg.origin {
        Some(origin) => write!(f, "{} {} {} {}", origin, msg.command, msg.middle, msg.trailing),
        None => write!(f, "{} {} {}", msg.command, msg.middle, msg.trailing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privmsg_rendering() {
        let msg: Message = ":Garcia!~Frederick@B.E.A.R.S PRIVMSG #botparty :I love #bears"
            .parse()
            .unwrap();
        assert_eq!(msg.to_string(), "#botparty <Garcia> I love #bears");
    }

    #[test]
    fn test_who_reply_rendering() {
        let msg: Message =
            ":irc.example.net 352 Garcia #bears crono crono.host * Crono H :0 Crono Example"
                .parse()
                .unwrap();
        assert_eq!(msg.to_string(), "#bears Crono crono@crono.host (Crono Example)");
    }

    #[test]
    fn test_join_rendering() {
        let msg: Message = ":MisterKpak!~IceChat77@verizon.example PART #chat".parse().unwrap();
        assert_eq!(
            msg.to_string(),
            "MisterKpak (~IceChat77@verizon.example) has left #chat"
        );
    }

    #[test]
    fn test_unrecognized_falls_back_to_base_fields() {
        let msg: Message = ":irc.example.net 005 me CASEMAPPING=ascii :are supported".parse().unwrap();
        assert_eq!(
            msg.to_string(),
            "irc.example.net 005 me CASEMAPPING=ascii are supported"
        );
    }
}
