//! Interactive client for the file-query service.
//!
//! The client connects to one endpoint, then repeats a simple cycle: prompt,
//! read a command line from the operator, send it, print the server's reply.
//! It exits cleanly after `quitc` or at the end of input, and with a failure
//! status when the server goes away.

use std::ffi::OsString;
use std::io::{BufRead, Write};
use std::process::ExitCode;

use clap::Parser;

use fileq_config::{SocketEndpoint, default_listen_endpoint};

mod errors;
mod transport;

use errors::AppError;
use transport::{Connection, IDLE_WINDOW, connect};

const PROMPT: &str = "Enter command : ";
const QUIT_COMMAND: &str = "quitc";

/// Command-line interface for the file-query client.
#[derive(Parser, Debug)]
#[command(name = "fileq", about = "Interactive file-query client")]
struct Cli {
    /// Server endpoint, for example `tcp://127.0.0.1:9089` or `unix:///run/fileq.sock`.
    #[arg(long, value_name = "ENDPOINT", default_value_t = default_listen_endpoint())]
    server: SocketEndpoint,
}

/// Runs the client with the provided arguments and IO handles.
#[must_use]
pub fn run<I, R, W, E>(args: I, stdin: &mut R, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: BufRead,
    W: Write,
    E: Write,
{
    let result = Cli::try_parse_from(args)
        .map_err(AppError::CliUsage)
        .and_then(|cli| {
            let mut connection = connect(&cli.server)?;
            writeln!(stdout, "Connected to server {}", cli.server).map_err(AppError::WriteOutput)?;
            Session {
                connection: &mut connection,
                stdin,
                stdout,
            }
            .run()
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::CliUsage(error)) if !error.use_stderr() => {
            let _ = write!(stdout, "{error}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

struct Session<'a, R: BufRead, W: Write> {
    connection: &'a mut Connection,
    stdin: &'a mut R,
    stdout: &'a mut W,
}

impl<R: BufRead, W: Write> Session<'_, R, W> {
    fn run(mut self) -> Result<(), AppError> {
        // A refused connection is told so before any command is sent.
        let greeting = self
            .connection
            .receive(Some(IDLE_WINDOW))
            .map_err(AppError::ReadResponse)?;
        if !greeting.text.is_empty() {
            self.print_response(&greeting.text)?;
        }
        if greeting.closed {
            return Err(AppError::Disconnected);
        }

        let mut line = String::new();
        loop {
            write!(self.stdout, "{PROMPT}").map_err(AppError::WriteOutput)?;
            self.stdout.flush().map_err(AppError::WriteOutput)?;

            line.clear();
            if self
                .stdin
                .read_line(&mut line)
                .map_err(AppError::ReadInput)?
                == 0
            {
                writeln!(self.stdout).map_err(AppError::WriteOutput)?;
                return Ok(());
            }
            let command = line.trim();
            if command.is_empty() {
                continue;
            }

            self.connection.send(command).map_err(|error| {
                if errors::is_disconnect(&error) {
                    AppError::Disconnected
                } else {
                    AppError::SendRequest(error)
                }
            })?;
            let response = self
                .connection
                .receive(None)
                .map_err(AppError::ReadResponse)?;
            if response.text.is_empty() {
                return Err(AppError::Disconnected);
            }
            self.print_response(&response.text)?;

            if command == QUIT_COMMAND {
                return Ok(());
            }
            if response.closed {
                return Err(AppError::Disconnected);
            }
        }
    }

    fn print_response(&mut self, text: &str) -> Result<(), AppError> {
        writeln!(self.stdout, "Server response:").map_err(AppError::WriteOutput)?;
        self.stdout
            .write_all(text.as_bytes())
            .map_err(AppError::WriteOutput)?;
        if !text.ends_with('\n') {
            writeln!(self.stdout).map_err(AppError::WriteOutput)?;
        }
        Ok(())
    }
}
