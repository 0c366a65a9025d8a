use std::str::FromStr;

use crate::model::addr;

/// Logical navigation commands, already decoded from whatever input the
/// host listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    RowStart,
    RowEnd,
    DocumentStart,
    DocumentEnd,
    PageUp,
    PageDown,

    /// Holds the mark in place while the caret moves (shift held down).
    BeginSelecting,
    EndSelecting,
    /// Snapshots the live selection into the tag list.
    ConfirmSelection,

    /// Moves the bit lane; crossing a byte boundary moves the caret.
    ShiftLane(i8),
    /// Scrolls the page by whole rows without moving the caret.
    Scroll(i64),
    /// Places the caret on a cell of the visible page.
    Click(u64),
    /// Places the caret and bit lane at an address.
    Goto(addr::Address),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    Unknown(String),
    MissingArgument(&'static str),
    MalformedNumber(&'static str, std::num::ParseIntError),
    MalformedAddress(addr::AddressParseError),
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Command, CommandParseError> {
        let (name, arg) = match s.trim().split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s.trim(), None),
        };

        Ok(match name {
            "left" => Command::MoveLeft,
            "right" => Command::MoveRight,
            "up" => Command::MoveUp,
            "down" => Command::MoveDown,
            "home" => Command::RowStart,
            "end" => Command::RowEnd,
            "start" => Command::DocumentStart,
            "finish" => Command::DocumentEnd,
            "pgup" => Command::PageUp,
            "pgdn" => Command::PageDown,
            "select" => Command::BeginSelecting,
            "unselect" => Command::EndSelecting,
            "confirm" => Command::ConfirmSelection,
            "lane+" => Command::ShiftLane(1),
            "lane-" => Command::ShiftLane(-1),
            "scroll" => Command::Scroll(
                arg.ok_or(CommandParseError::MissingArgument("scroll"))?
                    .parse().map_err(|e| CommandParseError::MalformedNumber("scroll", e))?),
            "click" => Command::Click(
                arg.ok_or(CommandParseError::MissingArgument("click"))?
                    .parse().map_err(|e| CommandParseError::MalformedNumber("click", e))?),
            "goto" => Command::Goto(
                addr::Address::parse(arg.ok_or(CommandParseError::MissingArgument("goto"))?, false)
                    .map_err(CommandParseError::MalformedAddress)?),
            other => return Err(CommandParseError::Unknown(other.to_string())),
        })
    }
}

/// Parses a whitespace- or comma-separated list of commands.
pub fn parse_script(script: &str) -> Result<Vec<Command>, CommandParseError> {
    script.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(Command::from_str)
        .collect()
}

impl std::fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandParseError::Unknown(name) => write!(f, "Unknown command '{}'", name),
            CommandParseError::MissingArgument(name) => write!(f, "Command '{}' needs an argument", name),
            CommandParseError::MalformedNumber(name, e) => write!(f, "Bad argument to '{}': {}", name, e),
            CommandParseError::MalformedAddress(e) => write!(f, "Bad address: {}", e),
        }
    }
}

impl std::error::Error for CommandParseError {
}
