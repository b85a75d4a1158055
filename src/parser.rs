use crate::error::SubeditError;
use crate::srt::{Cue, Stamp, Track};
use crate::timekey::TimeKey;

use std::fmt;

use nom::character::complete::digit1;
use nom::combinator::{all_consuming, map_res};
use nom::error::VerboseError;
use nom::IResult;

const TIME_SEPARATOR: &str = " --> ";

/// A recoverable load diagnostic: a timestamp that could not be parsed.
/// The affected endpoint stays in the track as [`Stamp::Broken`].
#[derive(Debug, PartialEq)]
pub struct LoadWarning {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}: {}", self.line, self.message)
    }
}

#[derive(Debug)]
pub struct ParseOutcome {
    pub track: Track,
    pub warnings: Vec<LoadWarning>,
}

pub struct Parser;
impl Parser {
    pub fn new() -> Self {
        Self {}
    }

    /// Loads a whole file. Blocks are separated by one or more blank lines:
    ///
    /// ```text
    /// <id>
    /// <start> --> <end>
    /// <content line>+
    /// ```
    ///
    /// A bad id line or a malformed time tag line aborts the load with a
    /// line-numbered error. A timestamp that fails to parse only degrades
    /// that endpoint and is reported as a warning. A trailing block not
    /// closed by a blank line is still committed.
    pub fn parse(&mut self, input: &str) -> Result<ParseOutcome, SubeditError> {
        let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);

        let mut cues = Vec::new();
        let mut warnings = Vec::new();
        let mut current: Option<PendingBlock> = None;
        let mut line_no = 0;

        for (index, raw) in input.split_inclusive('\n').enumerate() {
            line_no = index + 1;
            let line = trim_newline(raw);

            if line.is_empty() {
                if let Some(block) = current.take() {
                    cues.push(block.commit(line_no)?);
                }
                continue;
            }

            match current.as_mut() {
                None => {
                    let id = match cue_id(line.trim()) {
                        Some(id) => id,
                        None => return Err(SubeditError::BadEntryId { line: line_no }),
                    };
                    current = Some(PendingBlock {
                        id,
                        times: None,
                        content: Vec::new(),
                    });
                }
                Some(block) if block.times.is_none() => {
                    let parts: Vec<&str> = line.split(TIME_SEPARATOR).collect();
                    if parts.len() != 2 {
                        return Err(SubeditError::BadTimeRange { line: line_no });
                    }
                    let start = parse_stamp(parts[0], line_no, &mut warnings);
                    let end = parse_stamp(parts[1], line_no, &mut warnings);
                    block.times = Some((start, end));
                }
                Some(block) => block.content.push(raw.to_string()),
            }
        }

        if let Some(block) = current.take() {
            cues.push(block.commit(line_no)?);
        }

        Ok(ParseOutcome {
            track: Track::new(cues),
            warnings,
        })
    }
}

struct PendingBlock {
    id: u64,
    times: Option<(Stamp, Stamp)>,
    content: Vec<String>,
}

impl PendingBlock {
    fn commit(self, line: usize) -> Result<Cue, SubeditError> {
        match self.times {
            Some((start, end)) => Ok(Cue {
                id: self.id,
                start,
                end,
                content: self.content,
            }),
            None => Err(SubeditError::IncompleteEntry { line }),
        }
    }
}

fn trim_newline(raw: &str) -> &str {
    let line = raw.strip_suffix('\n').unwrap_or(raw);
    line.strip_suffix('\r').unwrap_or(line)
}

fn cue_id(line: &str) -> Option<u64> {
    let parsed: IResult<&str, u64, VerboseError<&str>> =
        all_consuming(map_res(digit1, str::parse))(line);
    parsed.ok().map(|(_, id)| id)
}

fn parse_stamp(text: &str, line: usize, warnings: &mut Vec<LoadWarning>) -> Stamp {
    match TimeKey::parse(text) {
        Ok(key) => Stamp::Time(key),
        Err(err) => {
            warnings.push(LoadWarning {
                line,
                message: format!("invalid time stamp '{}' ({})", text.trim(), err),
            });
            Stamp::Broken(text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> ParseOutcome {
        Parser::new().parse(input).unwrap()
    }

    #[test]
    fn parses_two_blocks() {
        let outcome = parse(
            "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n2\n00:00:05,000 --> 00:00:06,000\nWorld\nagain\n",
        );

        let track = outcome.track;
        assert!(outcome.warnings.is_empty());
        assert_eq!(track.len(), 2);
        assert_eq!(track.cue(0).id, 1);
        assert_eq!(track.cue(0).content, vec!["Hello\n"]);
        assert_eq!(
            track.cue(0).start,
            Stamp::Time(TimeKey::parse("00:00:01,000").unwrap())
        );
        assert_eq!(track.cue(1).id, 2);
        assert_eq!(track.cue(1).content, vec!["World\n", "again\n"]);
    }

    #[test]
    fn commits_trailing_block_without_final_blank_line() {
        let outcome = parse("1\n00:00:01,000 --> 00:00:02,000\nNo final newline");

        assert_eq!(outcome.track.len(), 1);
        assert_eq!(outcome.track.cue(0).content, vec!["No final newline"]);
    }

    #[test]
    fn skips_leading_and_repeated_blank_lines() {
        let outcome = parse(
            "\n\n1\n00:00:01,000 --> 00:00:02,000\nA\n\n\n\n2\n00:00:03,000 --> 00:00:04,000\nB\n\n",
        );

        assert_eq!(outcome.track.len(), 2);
    }

    #[test]
    fn keeps_crlf_terminators_in_content() {
        let outcome = parse("1\r\n00:00:01,000 --> 00:00:02,000\r\nLine\r\n\r\n");

        assert_eq!(outcome.track.cue(0).content, vec!["Line\r\n"]);
    }

    #[test]
    fn tolerates_byte_order_mark() {
        let outcome = parse("\u{FEFF}1\n00:00:01,000 --> 00:00:02,000\nA\n");

        assert_eq!(outcome.track.len(), 1);
    }

    #[test]
    fn bad_id_is_fatal_with_line_number() {
        let err = Parser::new()
            .parse("1\n00:00:01,000 --> 00:00:02,000\nA\n\nnot-a-number\n")
            .unwrap_err();

        assert_eq!(err, SubeditError::BadEntryId { line: 5 });
    }

    #[test]
    fn missing_separator_is_fatal() {
        let err = Parser::new()
            .parse("1\n00:00:01,000 -> 00:00:02,000\nA\n")
            .unwrap_err();

        assert_eq!(err, SubeditError::BadTimeRange { line: 2 });
    }

    #[test]
    fn duplicate_separator_is_fatal() {
        let err = Parser::new()
            .parse("1\n00:00:01,000 --> 00:00:02,000 --> 00:00:03,000\nA\n")
            .unwrap_err();

        assert_eq!(err, SubeditError::BadTimeRange { line: 2 });
    }

    #[test]
    fn block_without_time_line_is_fatal() {
        let err = Parser::new().parse("1\n\n").unwrap_err();

        assert_eq!(err, SubeditError::IncompleteEntry { line: 2 });
    }

    #[test]
    fn malformed_endpoint_degrades_and_warns() {
        let outcome = parse(
            "1\naa:bb:cc --> 00:00:02,000\nA\n\n2\n00:00:05,000 --> 00:00:06,000\nB\n",
        );

        assert_eq!(outcome.track.len(), 2);
        assert_eq!(
            outcome.track.cue(0).start,
            Stamp::Broken("aa:bb:cc".to_string())
        );
        assert_eq!(
            outcome.track.cue(0).end,
            Stamp::Time(TimeKey::parse("00:00:02,000").unwrap())
        );
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].line, 2);
        assert_eq!(
            outcome.warnings[0].to_string(),
            "2: invalid time stamp 'aa:bb:cc' (invalid number of hours)"
        );
    }

    #[test]
    fn empty_input_yields_empty_track() {
        let outcome = parse("");

        assert!(outcome.track.is_empty());
    }

    #[test]
    fn content_may_be_absent() {
        let outcome = parse("1\n00:00:01,000 --> 00:00:02,000\n\n");

        assert_eq!(outcome.track.len(), 1);
        assert!(outcome.track.cue(0).content.is_empty());
    }
}
