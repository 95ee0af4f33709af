//! Line-oriented user commands read from stdin

use std::str::FromStr;
use thiserror::Error;

/// A parsed user command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserCommand {
    Next,
    Prev,
    TogglePause,
    SeekForward,
    SeekBackward,
    /// Seek to a fraction (0.0..=1.0) of the current track
    SeekTo(f64),
    VolumeUp,
    VolumeDown,
    ToggleShuffle,
    CycleRepeat,
    Stop,
    Status,
    Queue,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0} (type `help`)")]
    Unknown(String),

    #[error("invalid seek position {0:?}: expected 0-100%")]
    InvalidPosition(String),
}

impl FromStr for UserCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Err(ParseCommandError::Empty);
        };

        let command = match word {
            "n" | "next" => UserCommand::Next,
            "b" | "prev" => UserCommand::Prev,
            "p" | "pause" => UserCommand::TogglePause,
            "f" | "forward" => UserCommand::SeekForward,
            "r" | "rewind" => UserCommand::SeekBackward,
            "g" | "goto" => {
                let position = words.next().unwrap_or_default();
                UserCommand::SeekTo(parse_fraction(position)?)
            }
            "+" | "up" => UserCommand::VolumeUp,
            "-" | "down" => UserCommand::VolumeDown,
            "s" | "shuffle" => UserCommand::ToggleShuffle,
            "R" | "repeat" => UserCommand::CycleRepeat,
            "x" | "stop" => UserCommand::Stop,
            "i" | "status" => UserCommand::Status,
            "l" | "queue" => UserCommand::Queue,
            "h" | "?" | "help" => UserCommand::Help,
            "q" | "quit" => UserCommand::Quit,
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// `50%` or `50` both mean halfway
fn parse_fraction(input: &str) -> Result<f64, ParseCommandError> {
    let digits = input.strip_suffix('%').unwrap_or(input);
    match digits.parse::<f64>() {
        Ok(percent) if (0.0..=100.0).contains(&percent) => Ok(percent / 100.0),
        _ => Err(ParseCommandError::InvalidPosition(input.to_string())),
    }
}

pub const HELP: &str = "\
commands:
  n, next        next track          b, prev       previous track
  p, pause       toggle pause        x, stop       stop playback
  f, forward     seek +10s           r, rewind     seek -10s
  g, goto <N%>   seek to N percent
  +, up          volume +5           -, down       volume -5
  s, shuffle     toggle shuffle      R, repeat     cycle repeat mode
  i, status      show status         l, queue      show upcoming tracks
  q, quit        exit";
