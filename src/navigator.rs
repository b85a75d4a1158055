use crate::command::NavCommand;
use crate::srt::Track;
use crate::timekey::TimeKey;

use std::fmt;

/// Cursor plus optional active search pattern.
///
/// Resolution is pure: [`Navigator::resolve`] computes the next state without
/// touching the current one, so a failed command never needs a rollback.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigator {
    pub cursor: Option<usize>,
    pub search: Option<String>,
}

/// A successful resolution: the next state, and for clamped partial moves a
/// note describing how far the cursor actually travelled.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub nav: Navigator,
    pub note: Option<Note>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Note {
    FurtherEntries(usize),
    EntriesBefore(usize),
    FurtherMatches(usize),
    MatchesBefore(usize),
}

impl fmt::Display for Note {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Note::FurtherEntries(n) => {
                write!(fmt, "only {} further entries, displaying last one", n)
            }
            Note::EntriesBefore(n) => {
                write!(fmt, "only {} entries before this point, displaying first one", n)
            }
            Note::FurtherMatches(n) => {
                write!(fmt, "only {} further matches, displaying last one", n)
            }
            Note::MatchesBefore(n) => {
                write!(fmt, "only {} matches before this point, displaying first one", n)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavError {
    NoSelection,
    NotEnoughEntries { max: usize },
    NotEnoughMatches { max: usize },
    NoFurtherEntry,
    NoEntryBefore,
    NoFurtherMatch,
    NoMatchBefore,
    NoMatch { pattern: String },
    NoEntryAfter { stamp: TimeKey },
    NotInSearchMode,
}

impl std::error::Error for NavError {}

impl fmt::Display for NavError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NavError::NoSelection => write!(fmt, "no entry selected"),
            NavError::NotEnoughEntries { max } => {
                write!(fmt, "not enough entries (max: {})", max)
            }
            NavError::NotEnoughMatches { max } => {
                write!(fmt, "not enough matches (max: {})", max)
            }
            NavError::NoFurtherEntry => write!(fmt, "no further entry"),
            NavError::NoEntryBefore => write!(fmt, "no entry before this point"),
            NavError::NoFurtherMatch => write!(fmt, "no further matches"),
            NavError::NoMatchBefore => write!(fmt, "no match before this point"),
            NavError::NoMatch { pattern } => write!(fmt, "no match for '{}'", pattern),
            NavError::NoEntryAfter { stamp } => write!(fmt, "no entry after {}", stamp),
            NavError::NotInSearchMode => write!(fmt, "not in search mode"),
        }
    }
}

impl Navigator {
    pub fn new() -> Self {
        Navigator {
            cursor: Some(0),
            search: None,
        }
    }

    pub fn resolve(&self, track: &Track, command: &NavCommand) -> Result<Outcome, NavError> {
        match command {
            NavCommand::Absolute(index) => self.absolute(track, *index),
            NavCommand::Step(delta) => self.step(track, *delta),
            NavCommand::JumpTimestamp(stamp) => self.jump(track, *stamp),
            NavCommand::Search(pattern) | NavCommand::FreeTextSearch(pattern) => {
                self.enter_search(track, pattern)
            }
            NavCommand::ExitSearch => self.exit_search(),
        }
    }

    fn moved(&self, cursor: usize, note: Option<Note>) -> Outcome {
        Outcome {
            nav: Navigator {
                cursor: Some(cursor),
                search: self.search.clone(),
            },
            note,
        }
    }

    fn absolute(&self, track: &Track, index: usize) -> Result<Outcome, NavError> {
        match &self.search {
            None => {
                if index < track.len() {
                    Ok(self.moved(index, None))
                } else {
                    Err(NavError::NotEnoughEntries {
                        max: track.len().saturating_sub(1),
                    })
                }
            }
            Some(pattern) => {
                let matches: Vec<usize> = track.match_indices(pattern).collect();
                match matches.get(index) {
                    Some(&cursor) => Ok(self.moved(cursor, None)),
                    None if matches.is_empty() => Err(NavError::NoMatch {
                        pattern: pattern.clone(),
                    }),
                    None => Err(NavError::NotEnoughMatches {
                        max: matches.len() - 1,
                    }),
                }
            }
        }
    }

    fn step(&self, track: &Track, delta: i64) -> Result<Outcome, NavError> {
        let cursor = self.cursor.ok_or(NavError::NoSelection)?;
        match &self.search {
            None => self.step_plain(track, cursor, delta),
            Some(pattern) => self.step_matches(track, cursor, delta, pattern),
        }
    }

    fn step_plain(&self, track: &Track, cursor: usize, delta: i64) -> Result<Outcome, NavError> {
        let last = track.len() - 1;
        if delta >= 0 {
            let want = delta as usize;
            if cursor + want <= last {
                Ok(self.moved(cursor + want, None))
            } else if want == 1 {
                Err(NavError::NoFurtherEntry)
            } else {
                Ok(self.moved(last, Some(Note::FurtherEntries(last - cursor))))
            }
        } else {
            let want = delta.unsigned_abs() as usize;
            if cursor >= want {
                Ok(self.moved(cursor - want, None))
            } else if want == 1 {
                Err(NavError::NoEntryBefore)
            } else {
                Ok(self.moved(0, Some(Note::EntriesBefore(cursor))))
            }
        }
    }

    fn step_matches(
        &self,
        track: &Track,
        cursor: usize,
        delta: i64,
        pattern: &str,
    ) -> Result<Outcome, NavError> {
        if delta >= 0 {
            let want = delta as usize;
            if want == 0 {
                return Ok(self.moved(cursor, None));
            }
            let mut taken = 0;
            let mut position = cursor;
            for index in cursor + 1..track.len() {
                if track.cue(index).matches(pattern) {
                    taken += 1;
                    position = index;
                    if taken == want {
                        return Ok(self.moved(position, None));
                    }
                }
            }
            if taken == 0 && want == 1 {
                Err(NavError::NoFurtherMatch)
            } else {
                Ok(self.moved(position, Some(Note::FurtherMatches(taken))))
            }
        } else {
            let want = delta.unsigned_abs() as usize;
            let mut taken = 0;
            let mut position = cursor;
            for index in (0..cursor).rev() {
                if track.cue(index).matches(pattern) {
                    taken += 1;
                    position = index;
                    if taken == want {
                        return Ok(self.moved(position, None));
                    }
                }
            }
            if taken == 0 && want == 1 {
                Err(NavError::NoMatchBefore)
            } else {
                Ok(self.moved(position, Some(Note::MatchesBefore(taken))))
            }
        }
    }

    /// First cue, scanning from the start of the track, whose start lies at
    /// or after `stamp`. Broken start stamps have no ordering and are
    /// skipped. The search state is not consulted and not changed.
    fn jump(&self, track: &Track, stamp: TimeKey) -> Result<Outcome, NavError> {
        for (index, cue) in track.cues().iter().enumerate() {
            if let Some(start) = cue.start.time() {
                if start >= stamp {
                    return Ok(self.moved(index, None));
                }
            }
        }
        Err(NavError::NoEntryAfter { stamp })
    }

    /// Sets a new pattern and enters search mode. Scans forward from the
    /// cursor (inclusive), wrapping exactly once to the start of the track.
    /// On failure neither the cursor nor the previous pattern changes.
    fn enter_search(&self, track: &Track, pattern: &str) -> Result<Outcome, NavError> {
        let cursor = self.cursor.unwrap_or(0);
        let forward = (cursor..track.len()).find(|&i| track.cue(i).matches(pattern));
        let hit = forward.or_else(|| (0..cursor).find(|&i| track.cue(i).matches(pattern)));
        match hit {
            Some(index) => Ok(Outcome {
                nav: Navigator {
                    cursor: Some(index),
                    search: Some(pattern.to_string()),
                },
                note: None,
            }),
            None => Err(NavError::NoMatch {
                pattern: pattern.to_string(),
            }),
        }
    }

    fn exit_search(&self) -> Result<Outcome, NavError> {
        if self.search.is_none() {
            return Err(NavError::NotInSearchMode);
        }
        Ok(Outcome {
            nav: Navigator {
                cursor: self.cursor,
                search: None,
            },
            note: None,
        })
    }
}
