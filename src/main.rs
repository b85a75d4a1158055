mod command;
mod error;
mod navigator;
mod parser;
mod serialiser;
mod session;
mod shifter;
mod srt;
mod timekey;

use crate::parser::Parser;
use crate::session::Session;

use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser as ClapParser};

fn main() {
    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("error: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Interactively retime a subtitle file")]
struct Cli {
    #[arg(
        value_name = "FILE",
        help = "The subtitle file to edit. Shifts are saved back to it in place."
    )]
    file: Option<PathBuf>,
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let path = match cli.file {
        Some(path) => path,
        None => {
            Cli::command().print_long_help()?;
            return Ok(());
        }
    };

    let data = std::fs::read_to_string(&path)
        .context(format!("cannot open file: '{}'", path.display()))?;

    let outcome = Parser::new()
        .parse(&data)
        .context(format!("Failed to load subtitle file: '{}'", path.display()))?;
    for warning in &outcome.warnings {
        eprintln!("warning: {}", warning);
    }
    if outcome.track.is_empty() {
        return Err(anyhow!("no entries found in file: '{}'", path.display()));
    }

    println!("subtitle successfully loaded!");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(outcome.track, path, stdin.lock(), stdout.lock());
    session.run()
}
