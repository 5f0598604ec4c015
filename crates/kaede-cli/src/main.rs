//! CLI entrypoint for the kaede scheduler client.
//!
//! The binary delegates to [`kaede_cli::run`], which parses the subcommand,
//! performs one scheduler call, and maps the outcome to the exit status.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    kaede_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
