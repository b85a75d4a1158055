use std::error::Error;
use std::fmt;

/// Fatal load errors. Any of these aborts the load; the file is not usable.
#[derive(Debug, PartialEq)]
pub enum SubeditError {
    /// The first line of a block did not parse as a non-negative integer.
    BadEntryId { line: usize },
    /// The second line of a block did not contain exactly one ` --> `.
    BadTimeRange { line: usize },
    /// A block ended before its time tag line.
    IncompleteEntry { line: usize },
}

impl Error for SubeditError {}

impl fmt::Display for SubeditError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SubeditError::BadEntryId { line } => write!(fmt, "{}: bad entry ID", line),
            SubeditError::BadTimeRange { line } => write!(
                fmt,
                "{}: bad time tag format (expected <time1> --> <time2>)",
                line
            ),
            SubeditError::IncompleteEntry { line } => {
                write!(fmt, "{}: incomplete entry (missing time tag line)", line)
            }
        }
    }
}

/// Field-specific timestamp parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeParseError {
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
}

impl Error for TimeParseError {}

impl fmt::Display for TimeParseError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let field = match self {
            TimeParseError::Hours => "hours",
            TimeParseError::Minutes => "minutes",
            TimeParseError::Seconds => "seconds",
            TimeParseError::Milliseconds => "milliseconds",
        };
        write!(fmt, "invalid number of {}", field)
    }
}
