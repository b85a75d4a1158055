use crate::srt::{Cue, Track};

use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Rewrites the whole track to `output`. No incremental updates: the file is
/// truncated and every cue is written back in track order.
pub fn serialise<P: AsRef<Path>>(track: &Track, output: P) -> Result<()> {
    let file = std::fs::File::create(output).context("Failed to create file!")?;
    let mut writer = BufWriter::new(file);
    write_track(&mut writer, track).context("Failed to write to output file.")?;
    writer.flush().context("Failed to write to output file.")?;
    Ok(())
}

pub fn write_track<W: Write>(buf: &mut W, track: &Track) -> Result<()> {
    for cue in track.cues() {
        write_cue(buf, cue)?;
    }
    Ok(())
}

fn write_cue<W: Write>(buf: &mut W, cue: &Cue) -> Result<()> {
    writeln!(buf, "{}", cue.id)?;
    writeln!(buf, "{} --> {}", cue.start, cue.end)?;
    for line in &cue.content {
        write!(buf, "{}", line)?;
    }
    // A last line without a terminator would otherwise swallow the separator.
    if let Some(last) = cue.content.last() {
        if !last.ends_with('\n') {
            writeln!(buf)?;
        }
    }
    writeln!(buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::srt::Stamp;
    use crate::timekey::TimeKey;

    fn written(track: &Track) -> String {
        let mut buf = Vec::new();
        write_track(&mut buf, track).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn writes_block_layout() {
        let track = Track::new(vec![Cue {
            id: 3,
            start: Stamp::Time(TimeKey::parse("00:00:01,000").unwrap()),
            end: Stamp::Time(TimeKey::parse("00:00:02,500").unwrap()),
            content: vec!["One\n".to_string(), "Two\n".to_string()],
        }]);

        assert_eq!(
            written(&track),
            "3\n00:00:01,000 --> 00:00:02,500\nOne\nTwo\n\n"
        );
    }

    #[test]
    fn terminates_unterminated_final_content_line() {
        let track = Track::new(vec![Cue {
            id: 1,
            start: Stamp::Time(TimeKey::new(0, 0)),
            end: Stamp::Time(TimeKey::new(1, 0)),
            content: vec!["tail".to_string()],
        }]);

        assert_eq!(written(&track), "1\n00:00:00,000 --> 00:00:01,000\ntail\n\n");
    }

    #[test]
    fn broken_stamp_round_trips_verbatim() {
        let input = "1\naa:bb:cc --> 00:00:02,000\nA\n\n";

        let outcome = Parser::new().parse(input).unwrap();

        assert_eq!(written(&outcome.track), input);
    }

    #[test]
    fn canonical_file_round_trips_byte_identical() {
        let input = "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n2\n00:00:05,000 --> 00:00:06,000\nWorld\nagain\n\n";

        let outcome = Parser::new().parse(input).unwrap();

        assert_eq!(written(&outcome.track), input);
    }

    #[test]
    fn non_canonical_times_are_normalised_on_write() {
        let input = "1\n0:1:2,3 --> 0,62999\nx\n\n";

        let outcome = Parser::new().parse(input).unwrap();

        assert_eq!(written(&outcome.track), "1\n00:01:02,003 --> 00:01:02,999\nx\n\n");
    }
}
