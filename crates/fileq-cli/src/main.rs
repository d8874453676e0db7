//! CLI entrypoint for the interactive file-query client.
//!
//! The binary delegates to [`fileq_cli::run`], wiring it to the process
//! arguments and standard streams.

use std::io::{self, StderrLock, StdinLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdin: StdinLock<'static> = io::stdin().lock();
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    fileq_cli::run(std::env::args_os(), &mut stdin, &mut stdout, &mut stderr)
}
