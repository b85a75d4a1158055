use crate::srt::{Stamp, Track};
use crate::timekey::TimeKey;

use std::fmt;

/// A delay as entered at the prompt: either a number of seconds to apply
/// directly, or a target timestamp for the selected cue's start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delay {
    Seconds(f64),
    Until(TimeKey),
}

/// Accepts a signed decimal number of seconds, or an absolute timestamp.
pub fn parse_delay(input: &str) -> Option<Delay> {
    let input = input.trim();
    if let Ok(seconds) = input.parse::<f64>() {
        if seconds.is_finite() {
            return Some(Delay::Seconds(seconds));
        }
        return None;
    }
    TimeKey::parse(input).ok().map(Delay::Until)
}

#[derive(Debug, PartialEq)]
pub struct ShiftReport {
    pub modified: usize,
    /// Indices of cues in range that were left untouched because one of
    /// their stamps is broken.
    pub skipped: Vec<usize>,
}

#[derive(Debug, PartialEq)]
pub enum ShiftError {
    PastZero { index: usize },
}

impl std::error::Error for ShiftError {}

impl fmt::Display for ShiftError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ShiftError::PastZero { index } => {
                write!(fmt, "entry {} would be moved before 00:00:00,000", index)
            }
        }
    }
}

/// Shifts every cue from `from` to the end of the track by `delta` seconds.
///
/// The new stamps are staged and validated first; nothing is written into
/// the track unless the whole shift is acceptable. Cues before `from` are
/// untouched. A cue with a broken stamp keeps both of its endpoints and is
/// reported in the outcome instead.
pub fn apply(track: &mut Track, from: usize, delta: f64) -> Result<ShiftReport, ShiftError> {
    let mut staged = Vec::new();
    let mut skipped = Vec::new();

    for (index, cue) in track.cues().iter().enumerate().skip(from) {
        match (cue.start.time(), cue.end.time()) {
            (Some(start), Some(end)) => {
                let start = start.offset(delta);
                let end = end.offset(delta);
                if start.is_negative() || end.is_negative() {
                    return Err(ShiftError::PastZero { index });
                }
                staged.push((index, start, end));
            }
            _ => skipped.push(index),
        }
    }

    let modified = staged.len();
    for (index, start, end) in staged {
        let cue = &mut track.cues_mut()[index];
        cue.start = Stamp::Time(start);
        cue.end = Stamp::Time(end);
    }

    Ok(ShiftReport { modified, skipped })
}
