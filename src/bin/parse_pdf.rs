use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use hnfeat::{extract_text_or_error, init_logging, PdfEnvelope};

const USAGE: &str = "Usage: parse_pdf <file_path>";

/// Print the text of a PDF's first and last ten pages as `{"result": ...}`.
#[derive(Debug, Parser)]
#[command(name = "parse_pdf", version, about)]
struct Cli {
    #[arg(allow_hyphen_values = true)]
    file_path: PathBuf,

    /// Raise log verbosity (repeatable). Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(_) => {
            println!("{USAGE}");
            return Ok(ExitCode::FAILURE);
        }
    };
    init_logging("warn", cli.verbose, false);

    let envelope = PdfEnvelope {
        result: extract_text_or_error(&cli.file_path),
    };
    let mut out = io::stdout().lock();
    serde_json::to_writer(&mut out, &envelope)?;
    writeln!(out)?;
    out.flush()?;
    Ok(ExitCode::SUCCESS)
}
