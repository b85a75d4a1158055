use crate::timekey::TimeKey;

use std::fmt;

/// One endpoint of a cue. An endpoint that failed to parse keeps its source
/// text so it round-trips verbatim; it has no ordering and no arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub enum Stamp {
    Time(TimeKey),
    Broken(String),
}

impl Stamp {
    pub fn time(&self) -> Option<TimeKey> {
        match self {
            Stamp::Time(key) => Some(*key),
            Stamp::Broken(_) => None,
        }
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Stamp::Time(key) => write!(fmt, "{}", key),
            Stamp::Broken(raw) => write!(fmt, "{}", raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Display-only identifier from the file; never renumbered.
    pub id: u64,
    pub start: Stamp,
    pub end: Stamp,
    /// Content lines, each retaining its own line terminator.
    pub content: Vec<String>,
}

impl Cue {
    pub fn text(&self) -> String {
        self.content.concat()
    }

    /// Case-sensitive substring match against the full cue content.
    pub fn matches(&self, pattern: &str) -> bool {
        self.text().contains(pattern)
    }
}

/// The cues of one file, in file order.
///
/// Unchecked precondition: the order is assumed to be non-decreasing in
/// `start`. It is never verified or repaired here.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    cues: Vec<Cue>,
}

impl Track {
    pub fn new(cues: Vec<Cue>) -> Self {
        Track { cues }
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn cue(&self, index: usize) -> &Cue {
        &self.cues[index]
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn cues_mut(&mut self) -> &mut [Cue] {
        &mut self.cues
    }

    /// Indices of cues whose content contains `pattern`, in track order.
    pub fn match_indices<'a>(&'a self, pattern: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.cues
            .iter()
            .enumerate()
            .filter(move |(_, cue)| cue.matches(pattern))
            .map(|(index, _)| index)
    }
}
