//! Input commands and chat-bubble formatting.

use chrono::{DateTime, Local};
use colored::Colorize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    History,
    Clear,
    Quit,
    Help,
    /// Anything else is sent to the bot.
    Say(&'a str),
    Empty,
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line {
            "" => Command::Empty,
            "/history" => Command::History,
            "/clear" => Command::Clear,
            "/quit" | "/exit" => Command::Quit,
            "/help" => Command::Help,
            other => Command::Say(other),
        }
    }
}

pub const HELP: &str = "Commands: /history  /clear  /quit  (anything else is sent to ClassyBot)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    You,
    Bot,
}

impl Speaker {
    /// Maps the API `sender` field; unknown senders render as the bot.
    pub fn from_sender(sender: &str) -> Self {
        if sender.eq_ignore_ascii_case("user") {
            Speaker::You
        } else {
            Speaker::Bot
        }
    }
}

/// Colored bubble for the terminal: `[HH:MM] You: text`.
pub fn bubble(speaker: Speaker, text: &str, at: DateTime<Local>) -> String {
    let stamp = format!("[{}]", at.format("%H:%M"));
    let stamp = stamp.as_str().dimmed();
    let label = match speaker {
        Speaker::You => "You:".green().bold(),
        Speaker::Bot => "Bot:".cyan().bold(),
    };
    format!("{stamp} {label} {}", text.trim())
}
