use crate::error::TimeParseError;

use std::fmt;

/// A subtitle timestamp, kept normalized so that `0 <= milliseconds < 1000`.
///
/// Ordering is lexicographic on `(seconds, milliseconds)`, which the derived
/// `Ord` provides as long as the field order is not changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeKey {
    seconds: i64,
    milliseconds: i64,
}

impl TimeKey {
    /// Builds a key from raw components, folding any millisecond carry or
    /// borrow into the seconds in a single division step.
    pub fn new(seconds: i64, milliseconds: i64) -> Self {
        TimeKey {
            seconds: seconds + milliseconds.div_euclid(1000),
            milliseconds: milliseconds.rem_euclid(1000),
        }
    }

    /// Parses a timestamp of the form `[[hh:]mm:]ss[,mmm]`.
    ///
    /// Whitespace around the value is ignored. Each field must be a
    /// non-negative integer; the error names the field that failed.
    /// Out-of-range fields are folded rather than rejected, so `0,1500`
    /// parses as `00:00:01,500`.
    pub fn parse(text: &str) -> Result<Self, TimeParseError> {
        let fields: Vec<&str> = text.trim().split(':').collect();
        if fields.len() > 3 {
            return Err(TimeParseError::Hours);
        }

        let mut seconds: i64 = 0;
        let mut iter = fields.iter();
        if fields.len() == 3 {
            let hours = field(iter.next().unwrap(), TimeParseError::Hours)?;
            seconds += hours * 3600;
        }
        if fields.len() >= 2 {
            let minutes = field(iter.next().unwrap(), TimeParseError::Minutes)?;
            seconds += minutes * 60;
        }

        let last: Vec<&str> = iter.next().unwrap().split(',').collect();
        if last.len() > 2 {
            return Err(TimeParseError::Milliseconds);
        }
        seconds += field(last[0], TimeParseError::Seconds)?;
        let milliseconds = if last.len() == 2 {
            field(last[1], TimeParseError::Milliseconds)?
        } else {
            0
        };

        Ok(TimeKey::new(seconds, milliseconds))
    }

    /// Applies a signed delta of fractional seconds.
    ///
    /// The delta is split into whole seconds and a millisecond remainder,
    /// added componentwise, and renormalized in closed form; negative deltas
    /// borrow via floor division instead of looping.
    pub fn offset(self, delta: f64) -> Self {
        let whole = delta.trunc() as i64;
        let millis = ((delta - delta.trunc()) * 1000.0).round() as i64;
        TimeKey::new(self.seconds + whole, self.milliseconds + millis)
    }

    /// Signed distance in seconds from `other` to `self`.
    pub fn offset_from(self, other: TimeKey) -> f64 {
        (self.seconds - other.seconds) as f64
            + (self.milliseconds - other.milliseconds) as f64 / 1000.0
    }

    /// True if the key lies before 00:00:00,000. Such a value may only exist
    /// transiently during arithmetic and must never be persisted.
    pub fn is_negative(self) -> bool {
        self.seconds < 0
    }
}

fn field(text: &str, err: TimeParseError) -> Result<i64, TimeParseError> {
    // u32 keeps single fields non-negative and comfortably below overflow
    // once multiplied out to seconds.
    text.parse::<u32>().map(i64::from).map_err(|_| err)
}

impl fmt::Display for TimeKey {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let hours = self.seconds / 3600;
        let minutes = (self.seconds % 3600) / 60;
        let seconds = self.seconds % 60;
        write!(
            fmt,
            "{:02}:{:02}:{:02},{:03}",
            hours, minutes, seconds, self.milliseconds
        )
    }
}
