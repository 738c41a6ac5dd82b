use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

// All words, with optional "!" prefix
static REGEX_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!?\w+").expect("command pattern is a valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Invite,
    Leaderboard,
    Countdown,
}

impl Command {
    pub fn is_command(input: &str) -> bool {
        Command::parse(input).is_some()
    }

    /// Command matching the first word of the message, if any. Arguments are ignored.
    pub fn parse(input: &str) -> Option<Command> {
        let start_with = REGEX_WORDS.find(input).map(|mat| mat.as_str())?;
        match start_with {
            "!help" => Some(Command::Help),
            "!invite" => Some(Command::Invite),
            "!leaderboard" | "!lb" => Some(Command::Leaderboard),
            "!aoc_countdown" => Some(Command::Countdown),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Command::Help => write!(f, "help"),
            Command::Invite => write!(f, "invite"),
            Command::Leaderboard => write!(f, "leaderboard"),
            Command::Countdown => write!(f, "aoc_countdown"),
        }
    }
}
