use crate::timekey::TimeKey;

use std::fmt;

use nom::character::complete::{digit1, one_of};
use nom::combinator::{all_consuming, map_res, opt};
use nom::error::VerboseError;
use nom::sequence::{pair, preceded};
use nom::bytes::complete::tag;
use nom::IResult;

/// One line of user input, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Empty line: start editing the current cue's time stamps.
    Shift,
    Help,
    Quit,
    Nav(NavCommand),
}

/// The commands that move the cursor or change the search state.
#[derive(Debug, Clone, PartialEq)]
pub enum NavCommand {
    /// `#n`: absolute index, or n-th match in search mode.
    Absolute(usize),
    /// `+n` / `-n`: relative movement; negative steps back.
    Step(i64),
    /// `?text`: explicit search.
    Search(String),
    /// Bare text that is not a timestamp.
    FreeTextSearch(String),
    /// A timestamp: jump to the first cue starting at or after it.
    JumpTimestamp(TimeKey),
    /// `?`: leave search mode.
    ExitSearch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    BadEntryIndex,
    BadStepCount,
}

impl std::error::Error for CommandError {}

impl fmt::Display for CommandError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CommandError::BadEntryIndex => write!(fmt, "invalid number of entry"),
            CommandError::BadStepCount => write!(fmt, "invalid number of entries"),
        }
    }
}

/// Classifies one input line. The named commands are case-insensitive;
/// everything else is routed by its first character, so `#`, `+`, `-` and
/// `?` inputs are never treated as search text.
pub fn classify(input: &str) -> Result<Command, CommandError> {
    if input.is_empty() {
        return Ok(Command::Shift);
    }
    match input.to_ascii_lowercase().as_str() {
        "q" | "quit" => return Ok(Command::Quit),
        "h" | "help" => return Ok(Command::Help),
        _ => (),
    }

    match input.as_bytes()[0] {
        b'#' => absolute(input),
        b'+' | b'-' => step(input),
        b'?' => Ok(Command::Nav(question(input))),
        _ => Ok(Command::Nav(plain(input))),
    }
}

fn absolute(input: &str) -> Result<Command, CommandError> {
    let parsed: IResult<&str, usize, VerboseError<&str>> =
        all_consuming(preceded(tag("#"), map_res(digit1, str::parse)))(input);
    match parsed {
        Ok((_, index)) => Ok(Command::Nav(NavCommand::Absolute(index))),
        Err(_) => Err(CommandError::BadEntryIndex),
    }
}

fn step(input: &str) -> Result<Command, CommandError> {
    let parsed: IResult<&str, (char, Option<i64>), VerboseError<&str>> =
        all_consuming(pair(one_of("+-"), opt(map_res(digit1, str::parse))))(input);
    match parsed {
        Ok((_, (sign, count))) => {
            let count = count.unwrap_or(1);
            let count = if sign == '-' { -count } else { count };
            Ok(Command::Nav(NavCommand::Step(count)))
        }
        Err(_) => Err(CommandError::BadStepCount),
    }
}

fn question(input: &str) -> NavCommand {
    let pattern = &input[1..];
    if pattern.is_empty() {
        NavCommand::ExitSearch
    } else {
        NavCommand::Search(pattern.to_string())
    }
}

fn plain(input: &str) -> NavCommand {
    match TimeKey::parse(input) {
        Ok(key) => NavCommand::JumpTimestamp(key),
        Err(_) => NavCommand::FreeTextSearch(input.to_string()),
    }
}
