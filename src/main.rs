use std::env;
use std::error::Error;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::Level;

use htmldiff::DiffOptions;

/// Compare two HTML documents, ignoring differences between the DocBook and
/// AsciiDoc renderings of the same content.
///
/// The unified diff of the normalized documents is written to stderr. Exits
/// with 0 when the documents are equivalent and 1 when they differ.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The two HTML files to compare. Put `--` before paths starting with `-`.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Lines of context around each change.
    #[arg(short = 'U', long, value_name = "N", default_value_t = 3)]
    unified: usize,

    /// Log diagnostics to stderr. Repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    // stderr carries the report, so stay silent unless asked
    if verbose == 0 {
        return;
    }
    let level = if verbose == 1 {
        Level::DEBUG
    } else {
        Level::TRACE
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn print_error(err: &dyn Error) {
    eprintln!("error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}

/// Write report lines as raw UTF-8 so no platform encoding gets in the way.
fn write_report(report: &[String]) -> io::Result<()> {
    let mut stderr = io::stderr().lock();
    for line in report {
        stderr.write_all(line.as_bytes())?;
        stderr.write_all(b"\n")?;
    }
    stderr.flush()
}

fn usage_error(received: &[String]) -> ExitCode {
    println!("Expected exactly 2 arguments but got {received:?}");
    ExitCode::from(1)
}

fn run(cli: Cli) -> Result<ExitCode, ExitCode> {
    let [path_a, path_b] = cli.files.as_slice() else {
        let received: Vec<String> = cli
            .files
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        return Err(usage_error(&received));
    };

    let options = DiffOptions {
        context: cli.unified,
    };

    let report = htmldiff::compare_files(path_a, path_b, &options).map_err(|e| {
        print_error(&e);
        ExitCode::from(2)
    })?;

    write_report(&report).map_err(|e| {
        print_error(&e);
        ExitCode::from(2)
    })?;

    if report.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Err(ExitCode::from(1))
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // an unknown flag is just another wrong argument list
        Err(e) if e.kind() == ErrorKind::UnknownArgument => {
            let received: Vec<String> = env::args_os()
                .skip(1)
                .map(|a| a.to_string_lossy().into_owned())
                .collect();
            return usage_error(&received);
        }
        Err(e) => e.exit(),
    };
    init_logging(cli.verbose);
    match run(cli) {
        Ok(code) => code,
        Err(code) => code,
    }
}
