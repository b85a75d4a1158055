use crate::command::{classify, Command, NavCommand};
use crate::navigator::Navigator;
use crate::serialiser;
use crate::shifter::{self, Delay};
use crate::srt::Track;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

/// The interactive command loop.
///
/// Reads one line at a time from `input` and writes everything, prompts and
/// diagnostics included, to `out`. Fully synchronous: a command is resolved
/// and any resulting file rewrite completed before the next prompt.
pub struct Session<R, W> {
    track: Track,
    nav: Navigator,
    path: PathBuf,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(track: Track, path: PathBuf, input: R, out: W) -> Self {
        Session {
            track,
            nav: Navigator::new(),
            path,
            input,
            out,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        writeln!(
            self.out,
            "note: if you need help, type 'help' or 'h'. Type 'q' to exit.\n"
        )?;

        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;

            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(()),
            };

            match classify(&line) {
                Err(err) => writeln!(self.out, "error: {}", err)?,
                Ok(Command::Quit) => return Ok(()),
                Ok(Command::Help) => self.print_help()?,
                Ok(Command::Shift) => self.shift_current()?,
                Ok(Command::Nav(command)) => match self.nav.resolve(&self.track, &command) {
                    Ok(outcome) => {
                        self.nav = outcome.nav;
                        if let Some(note) = outcome.note {
                            writeln!(self.out, "error: {}", note)?;
                        }
                        self.show_current()?;
                    }
                    Err(err) => writeln!(self.out, "error: {}", err)?,
                },
            }
        }
    }

    /// Next input line without its terminator, or `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read command input")?;
        if read == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    fn show_current(&mut self) -> Result<()> {
        if let Some(index) = self.nav.cursor {
            let cue = self.track.cue(index);
            writeln!(self.out, "\n[{}] {} :\n\n{}", index, cue.start, cue.text())?;
        }
        Ok(())
    }

    /// The empty-line command: ask for a delay, shift from the cursor to the
    /// end of the track, and rewrite the file.
    fn shift_current(&mut self) -> Result<()> {
        let cursor = match self.nav.cursor {
            Some(cursor) => cursor,
            None => {
                writeln!(self.out, "error: no entry selected")?;
                return Ok(());
            }
        };

        writeln!(
            self.out,
            "\nhow many seconds do you want to add / remove (empty to abort)? "
        )?;

        let delta = loop {
            self.out.flush()?;
            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(()),
            };
            if line.is_empty() {
                writeln!(self.out)?;
                return Ok(());
            }

            match shifter::parse_delay(&line) {
                Some(Delay::Seconds(seconds)) => break seconds,
                Some(Delay::Until(target)) => match self.track.cue(cursor).start.time() {
                    Some(start) => break target.offset_from(start),
                    None => write!(
                        self.out,
                        "error: the current entry's start time stamp is invalid, please enter \
                         a number of seconds (or nothing to abort): "
                    )?,
                },
                None => write!(
                    self.out,
                    "error: invalid time duration, please enter a floating point number or a \
                     time stamp (or nothing to abort): "
                )?,
            }
        };

        write!(self.out, "editing subtitle, please wait... ")?;
        match shifter::apply(&mut self.track, cursor, delta) {
            Ok(report) => {
                write!(
                    self.out,
                    "done ({} entries modified).\nSaving... ",
                    report.modified
                )?;
                serialiser::serialise(&self.track, &self.path)?;
                writeln!(self.out, " done.")?;
                for index in report.skipped {
                    writeln!(
                        self.out,
                        "warning: entry {} has an invalid time stamp and was not shifted",
                        index
                    )?;
                }
            }
            Err(err) => writeln!(self.out, "\nerror: {}", err)?,
        }
        Ok(())
    }

    fn print_help(&mut self) -> Result<()> {
        writeln!(self.out, "\nsubedit v{}\n", env!("CARGO_PKG_VERSION"))?;
        writeln!(self.out, "  This program can do some basic editing on subtitles.")?;
        writeln!(self.out, "  Its only function for now is to be able to add a delay to a")?;
        writeln!(self.out, "  particular sentence, shifting all the following ones.")?;
        writeln!(self.out, "  To do so, you must first pick the sentence you want to shift")?;
        writeln!(self.out, "  (using any of the various possibilities described below),")?;
        writeln!(self.out, "  then press 'Enter' to input the amount of seconds you want")?;
        writeln!(self.out, "  to add/remove. The program will update the subtitle accordingly")?;
        writeln!(self.out, "  and save it right away, so you can immediately check the result")?;
        writeln!(self.out, "  in your favorite movie player.")?;
        writeln!(self.out, "  Note that some players require a restart for the changes to be")?;
        writeln!(self.out, "  effective (VLC for example).\n")?;
        writeln!(self.out, "Available search commands:")?;
        writeln!(self.out, "  hh:mm:ss,mili : select the sentence just after the provided time stamp")?;
        writeln!(self.out, "  any text      : search for occurrences of 'any text', enters search mode")?;
        writeln!(self.out, "  ?             : exit search mode")?;
        writeln!(self.out, "  #n            : select the 'n'th sentence ('n'th occurrence in search mode)")?;
        writeln!(self.out, "  +x            : advance 'x' times (next occurrences in search mode)")?;
        writeln!(self.out, "  +             : advance once (next occurrence in search mode)")?;
        writeln!(self.out, "  -x            : step back 'x' times (previous occurrences in search mode)")?;
        writeln!(self.out, "  -             : step back once (previous occurrence in search mode)\n")?;
        writeln!(self.out, "Other commands:")?;
        writeln!(self.out, "  'empty'       : starts editing the current sentence's time stamp")?;
        writeln!(self.out, "  help or h     : displays this text")?;
        writeln!(self.out, "  quit or q     : exits the program\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;

    const TWO_CUES: &str = "\
0
00:00:01,000 --> 00:00:02,000
First

1
00:00:05,000 --> 00:00:06,000
Second
";

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("subedit-{}-{}.srt", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    fn run_session(name: &str, file: &str, input: &str) -> (String, String) {
        let path = temp_file(name, file);
        let track = Parser::new().parse(file).unwrap().track;

        let mut out = Vec::new();
        let mut session = Session::new(track, path.clone(), Cursor::new(input), &mut out);
        session.run().unwrap();

        let saved = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();
        (String::from_utf8(out).unwrap(), saved)
    }

    #[test]
    fn select_and_shift_rewrites_the_file() {
        let (output, saved) = run_session("shift", TWO_CUES, "#0\n\n+2.5\nq\n");

        assert!(output.contains("[0] 00:00:01,000 :"));
        assert!(output.contains("done (2 entries modified)."));
        assert_eq!(
            saved,
            "0\n00:00:03,500 --> 00:00:04,500\nFirst\n\n1\n00:00:07,500 --> 00:00:08,500\nSecond\n\n"
        );
    }

    #[test]
    fn shift_by_target_timestamp() {
        // Move the second cue's start to 00:00:07,000: a delta of +2 s.
        let (output, saved) = run_session("target", TWO_CUES, "#1\n\n00:00:07,000\nq\n");

        assert!(output.contains("done (1 entries modified)."));
        assert!(saved.contains("0\n00:00:01,000 --> 00:00:02,000"));
        assert!(saved.contains("1\n00:00:07,000 --> 00:00:08,000"));
    }

    #[test]
    fn empty_delay_aborts_without_saving() {
        let (output, saved) = run_session("abort", TWO_CUES, "\n\nq\n");

        assert!(output.contains("how many seconds"));
        // The file still holds its original contents.
        assert_eq!(saved, TWO_CUES);
    }

    #[test]
    fn invalid_delay_reprompts_until_aborted() {
        let (output, saved) = run_session("retry", TWO_CUES, "\nbogus\n\nq\n");

        assert!(output.contains("error: invalid time duration"));
        assert_eq!(saved, TWO_CUES);
    }

    #[test]
    fn search_then_shift_only_touches_later_cues() {
        let (output, saved) = run_session("search", TWO_CUES, "Second\n\n1\nq\n");

        assert!(output.contains("[1] 00:00:05,000 :"));
        assert!(output.contains("done (1 entries modified)."));
        assert!(saved.contains("0\n00:00:01,000 --> 00:00:02,000"));
        assert!(saved.contains("1\n00:00:06,000 --> 00:00:07,000"));
    }

    #[test]
    fn command_errors_keep_the_loop_alive() {
        let (output, saved) = run_session("errors", TWO_CUES, "#9\n?\n+x\nq\n");

        assert!(output.contains("error: not enough entries (max: 1)"));
        assert!(output.contains("error: not in search mode"));
        assert!(output.contains("error: invalid number of entries"));
        assert_eq!(saved, TWO_CUES);
    }

    #[test]
    fn rejected_shift_leaves_the_file_alone() {
        let (output, saved) = run_session("pastzero", TWO_CUES, "#0\n\n-5\nq\n");

        assert!(output.contains("error: entry 0 would be moved before 00:00:00,000"));
        assert_eq!(saved, TWO_CUES);
    }

    #[test]
    fn end_of_input_quits() {
        let (_, saved) = run_session("eof", TWO_CUES, "#1\n");

        assert_eq!(saved, TWO_CUES);
    }
}
