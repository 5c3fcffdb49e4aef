//! The stock user-command set.
//!
//! Command structs are stateless units; behavior lives in their
//! [`UserCommand`] impls and validation in the guard chains they are
//! registered with.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use ursa_proto::Kind;

use crate::error::HandlerResult;

use super::{CommandContext, CommandTable, Guard, UserCommand};

/// Register the stock commands into a table.
pub fn register(table: &mut CommandTable) {
    table.register(
        "help",
        vec![],
        "help *[command] - Lists commands, their syntax, and descriptions.",
        Arc::new(Help),
    );
    table.register(
        "bots",
        vec![Guard::NoArgs],
        "bots - Reports itself as a bot.",
        Arc::new(Bots),
    );
    table.register(
        "hbd",
        vec![Guard::NoArgs],
        "hbd - Wishes you a happy bear day.",
        Arc::new(Hbd),
    );
    table.register(
        "reverse",
        vec![Guard::RequiresArgs],
        "reverse [string] - Replies with the string reversed.",
        Arc::new(Reverse),
    );
    table.register(
        "rot13",
        vec![Guard::RequiresArgs],
        "rot13 [message] - Encodes (decodes) rot13.",
        Arc::new(Rot13),
    );
    table.register(
        "rps",
        vec![Guard::OneArg],
        "rps [rock|paper|scissors] - Play rock, paper, scissors, BEAR!",
        Arc::new(Rps),
    );
    table.register(
        "say",
        vec![Guard::RequiresArgs],
        "say [user|#channel] [message] - Says the message at the target.",
        Arc::new(Say),
    );
    table.register(
        "action",
        vec![Guard::RequiresArgs],
        "action [message] - Performs an action (\"/me\") here.",
        Arc::new(Action),
    );
    table.register(
        "who",
        vec![Guard::OneArg],
        "who [target] - Returns WHO information for the target.",
        Arc::new(Who),
    );
    table.register(
        "join",
        vec![Guard::OwnerOnly, Guard::RequiresArgs],
        "join [#channel(s)] - Joins the channels specified.",
        Arc::new(Join),
    );
    table.register(
        "part",
        vec![Guard::OwnerOnly],
        "part *[#channel(s)] - Parts the channels, or the current one.",
        Arc::new(Part),
    );
    table.register(
        "quit",
        vec![Guard::OwnerOnly],
        "quit *[message] - Disconnects from the server.",
        Arc::new(Quit),
    );
    table.register(
        "delay",
        vec![Guard::OwnerOnly],
        "delay *[seconds] - Shows or sets the message delay.",
        Arc::new(Delay),
    );
    table.register(
        "prefix",
        vec![Guard::OwnerOnly, Guard::RequiresArgs],
        "prefix [char] - Changes the command prefix.",
        Arc::new(Prefix),
    );
    table.register(
        "chatter",
        vec![Guard::RequiresArgs],
        "chatter [on|off|list] - Controls the passive chatter module.",
        Arc::new(ChatterToggle),
    );
}

struct Help;

#[async_trait]
impl UserCommand for Help {
    async fn run(&self, cc: &mut CommandContext<'_, '_>) -> HandlerResult {
        let prefix = cc.cmd_prefix();
        match &cc.request.args {
            None => {
                let listing = cc
                    .commands()
                    .roots()
                    .map(|root| format!("{}{}", prefix, root))
                    .collect::<Vec<_>>()
                    .join(" ");
                cc.notice(&format!(
                    "Type {}help [command] for the syntax and description of a command",
                    prefix
                ))
                .await?;
                cc.notice(&listing).await
            }
            Some(args) if args.len() == 1 => match cc.commands().get(&args[0]) {
                Some(entry) => {
                    let text = format!("{}{}: {}", prefix, args[0], entry.help());
                    cc.notice(&text).await
                }
                None => cc.notice(&format!("{} is not a command", args[0])).await,
            },
            Some(_) => cc.notice("The help command takes only one argument").await,
        }
    }
}

struct Bots;

#[async_trait]
impl UserCommand for Bots {
    async fn run(&self, cc: &mut CommandContext<'_, '_>) -> HandlerResult {
        cc.reply("Reporting in.").await
    }
}

struct Hbd;

#[async_trait]
impl UserCommand for Hbd {
    async fn run(&self, cc: &mut CommandContext<'_, '_>) -> HandlerResult {
        let nick = cc.nick().unwrap_or("friend").to_owned();
        cc.reply(&format!("Happy bear day, {}!", nick)).await
    }
}

struct Reverse;

#[async_trait]
impl UserCommand for Reverse {
    async fn run(&self, cc: &mut CommandContext<'_, '_>) -> HandlerResult {
        let text = cc.request.joined_args().unwrap_or_default();
        let reversed: String = text.chars().rev().collect();
        cc.reply(&reversed).await
    }
}

struct Rot13;

#[async_trait]
impl UserCommand for Rot13 {
    async fn run(&self, cc: &mut CommandContext<'_, '_>) -> HandlerResult {
        let text = cc.request.joined_args().unwrap_or_default();
        cc.reply(&rot13(&text)).await
    }
}

/// Rotate ASCII letters by 13 places; everything else passes through.
fn rot13(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' => (((c as u8 - b'a' + 13) % 26) + b'a') as char,
            'A'..='Z' => (((c as u8 - b'A' + 13) % 26) + b'A') as char,
            other => other,
        })
        .collect()
}

struct Rps;

const RPS_OPTIONS: [&str; 3] = ["rock", "paper", "scissors"];

#[async_trait]
impl UserCommand for Rps {
    async fn run(&self, cc: &mut CommandContext<'_, '_>) -> HandlerResult {
        let choice = cc
            .request
            .args
            .as_ref()
            .and_then(|args| args.first())
            .map(|arg| arg.to_lowercase())
            .unwrap_or_default();
        let source = cc.source().to_owned();

        if choice == "bear" {
            return cc.action(&source, "runs away..").await;
        }
        if !RPS_OPTIONS.contains(&choice.as_str()) {
            return cc
                .reply("That is not a valid choice. I'm not playing with you anymore.")
                .await;
        }

        let play = RPS_OPTIONS[rand::thread_rng().gen_range(0..RPS_OPTIONS.len())];
        let nick = cc.nick().unwrap_or("friend").to_owned();

        cc.reply("Rock... Paper... ").await?;
        if play == choice {
            cc.reply("BEARRRRR!!!").await?;
            return cc
                .action(
                    &source,
                    &format!("wins because bear eats {} and {}.", choice, nick),
                )
                .await;
        }
        cc.reply("Scissors...").await?;
        cc.action(&source, &format!("forms {} with a paw.", play))
            .await?;

        let player_wins = matches!(
            (play, choice.as_str()),
            ("scissors", "rock") | ("rock", "paper") | ("paper", "scissors")
        );
        if player_wins {
            cc.reply(&format!(
                "Congratulations, {}, you win this time! {} beats {} :)",
                nick, choice, play
            ))
            .await
        } else {
            cc.reply(&format!(
                "Sorry, {}, you lost this time. {} beats {} :(",
                nick, play, choice
            ))
            .await
        }
    }
}

struct Say;

#[async_trait]
impl UserCommand for Say {
    async fn run(&self, cc: &mut CommandContext<'_, '_>) -> HandlerResult {
        let args = cc.request.args.clone().unwrap_or_default();
        if args.len() < 2 {
            let prefix = cc.cmd_prefix();
            return cc
                .reply(&format!("Requires: {}say [user|#channel] [message]", prefix))
                .await;
        }
        let target = &args[0];
        if args[1] == "/me" {
            cc.action(target, &args[2..].join(" ")).await
        } else {
            cc.say(target, &args[1..].join(" ")).await
        }
    }
}

struct Action;

#[async_trait]
impl UserCommand for Action {
    async fn run(&self, cc: &mut CommandContext<'_, '_>) -> HandlerResult {
        let text = cc.request.joined_args().unwrap_or_default();
        let source = cc.source().to_owned();
        cc.action(&source, &text).await
    }
}

struct Who;

#[async_trait]
impl UserCommand for Who {
    async fn run(&self, cc: &mut CommandContext<'_, '_>) -> HandlerResult {
        let target = cc
            .request
            .args
            .as_ref()
            .and_then(|args| args.first())
            .cloned()
            .unwrap_or_default();
        let replies = cc.who(&target).await?;
        let rows: Vec<String> = replies
            .iter()
            .filter(|msg| matches!(msg.kind, Kind::WhoReply(_)))
            .map(|msg| msg.to_string())
            .collect();
        if rows.is_empty() {
            return cc.reply(&format!("No WHO results for {}", target)).await;
        }
        for row in rows {
            cc.reply(&row).await?;
        }
        Ok(())
    }
}

struct Join;

#[async_trait]
impl UserCommand for Join {
    async fn run(&self, cc: &mut CommandContext<'_, '_>) -> HandlerResult {
        let channels = cc.request.args.clone().unwrap_or_default();
        let failures = cc.join(&channels).await?;
        for failure in failures {
            cc.reply(&format!("Error: {}", failure.params)).await?;
        }
        Ok(())
    }
}

struct Part;

#[async_trait]
impl UserCommand for Part {
    async fn run(&self, cc: &mut CommandContext<'_, '_>) -> HandlerResult {
        match cc.request.args.clone() {
            Some(channels) => cc.part(&channels, "").await,
            None => {
                let source = cc.source().to_owned();
                if source.starts_with('#') {
                    cc.part(&[source], "").await
                } else {
                    let prefix = cc.cmd_prefix();
                    cc.reply(&format!("Requires: {}part [#channel(s)]", prefix))
                        .await
                }
            }
        }
    }
}

struct Quit;

#[async_trait]
impl UserCommand for Quit {
    async fn run(&self, cc: &mut CommandContext<'_, '_>) -> HandlerResult {
        let message = cc
            .request
            .joined_args()
            .unwrap_or_else(|| "Okay, bye".to_owned());
        cc.quit(&message).await
    }
}

struct Delay;

#[async_trait]
impl UserCommand for Delay {
    async fn run(&self, cc: &mut CommandContext<'_, '_>) -> HandlerResult {
        let prefix = cc.cmd_prefix();
        match cc.request.args.clone() {
            None => {
                let current = cc.msg_delay().as_secs_f64();
                cc.reply(&format!("The current delay is set to {} seconds", current))
                    .await
            }
            Some(args) if args.len() == 1 => match args[0].parse::<f64>() {
                Ok(seconds) if (0.0..=10.0).contains(&seconds) => {
                    cc.set_msg_delay(Duration::from_secs_f64(seconds));
                    cc.reply(&format!("Message delay set to {} seconds.", seconds))
                        .await
                }
                Ok(_) => cc.reply("Delay must be from 0 - 10 seconds.").await,
                Err(_) => {
                    cc.reply(&format!("Invalid input. Requires: {}delay [seconds]", prefix))
                        .await
                }
            },
            Some(_) => {
                cc.reply(&format!(
                    "Too many arguments. Requires: {}delay [seconds]",
                    prefix
                ))
                .await
            }
        }
    }
}

struct Prefix;

#[async_trait]
impl UserCommand for Prefix {
    async fn run(&self, cc: &mut CommandContext<'_, '_>) -> HandlerResult {
        let args = cc.request.args.clone().unwrap_or_default();
        let new_prefix = if args.len() == 1 {
            let mut chars = args[0].chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        } else {
            None
        };
        match new_prefix {
            Some(c) => {
                cc.set_cmd_prefix(c);
                cc.reply(&format!("Command prefix set to: {}", c)).await
            }
            None => {
                let prefix = cc.cmd_prefix();
                cc.reply(&format!("Improper syntax. Requires: {}prefix [char]", prefix))
                    .await
            }
        }
    }
}

struct ChatterToggle;

#[async_trait]
impl UserCommand for ChatterToggle {
    async fn run(&self, cc: &mut CommandContext<'_, '_>) -> HandlerResult {
        let args = cc.request.args.clone().unwrap_or_default();

        // Collect replies under the lock, deliver after releasing it.
        let mut lines = Vec::new();
        {
            let Ok(mut chatter) = cc.chatter().lock() else {
                return Ok(());
            };
            for arg in &args {
                match arg.as_str() {
                    "on" => {
                        if chatter.is_enabled() {
                            lines.push("Chatter is already turned on.".to_owned());
                        } else {
                            chatter.set_enabled(true);
                            lines.push("Chatter turned on.".to_owned());
                        }
                    }
                    "off" => {
                        if !chatter.is_enabled() {
                            lines.push("Chatter is already turned off.".to_owned());
                        } else {
                            chatter.set_enabled(false);
                            lines.push("Chatter turned off.".to_owned());
                        }
                    }
                    "list" => {
                        let triggers = chatter.triggers().collect::<Vec<_>>().join(", ");
                        lines.push(format!("Chatter triggers: {}", triggers));
                    }
                    _ => {}
                }
            }
        }
        for line in lines {
            cc.reply(&line).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rot13_round_trips() {
        assert_eq!(rot13("Hello, World!"), "Uryyb, Jbeyq!");
        assert_eq!(rot13(&rot13("bear necessities")), "bear necessities");
    }

    #[test]
    fn test_rot13_leaves_non_ascii_alone() {
        assert_eq!(rot13("abc 123 #chan"), "nop 123 #puna");
    }
}
