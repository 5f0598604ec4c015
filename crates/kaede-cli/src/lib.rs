//! Command-line client for the kaede recording scheduler.
//!
//! The runtime parses one subcommand, validates its arguments, opens a single
//! connection to the scheduler, performs exactly one remote call, and renders
//! the result. Connection handling sits behind the `Connector` seam so tests
//! can substitute an in-process scheduler.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::{debug, info};

mod cli;
mod command;
mod errors;
mod output;
mod telemetry;
mod transport;

use cli::Cli;
use command::{CommandInvocation, SchedulerRequest};
use errors::{AppError, render_error_chain};
use output::write_lines;
use transport::{ConnectionSettings, Connector, GrpcConnector, Scheduler};

/// Bundles the output streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

struct CliRunner<'a, W: Write, E: Write, C: Connector> {
    io: IoStreams<'a, W, E>,
    connector: &'a C,
}

impl<'a, W, E, C> CliRunner<'a, W, E, C>
where
    W: Write,
    E: Write,
    C: Connector,
{
    const fn new(io: IoStreams<'a, W, E>, connector: &'a C) -> Self {
        Self { io, connector }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        match self.dispatch(args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(AppError::CliUsage(error))
                if matches!(
                    error.kind(),
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
                ) =>
            {
                match write!(self.io.stdout, "{}", error.render()) {
                    Ok(()) => ExitCode::SUCCESS,
                    Err(_) => ExitCode::FAILURE,
                }
            }
            Err(error) => {
                let _ = writeln!(self.io.stderr, "{}", render_error_chain(&error));
                ExitCode::FAILURE
            }
        }
    }

    fn dispatch<I>(&mut self, args: I) -> Result<(), AppError>
    where
        I: IntoIterator<Item = OsString>,
    {
        let cli = Cli::try_parse_from(args).map_err(AppError::CliUsage)?;
        telemetry::initialise(&cli.global)?;
        let command = cli.command.ok_or(AppError::NoSubcommand)?;
        let invocation = CommandInvocation::try_from(command)?;
        let settings = ConnectionSettings::new(invocation.address, &cli.global);
        execute(invocation.request, &settings, self.connector, &mut *self.io.stdout)
    }
}

/// Performs one validated request against the scheduler.
///
/// The session is dropped, closing the connection, on every return path.
fn execute<C, W>(
    request: SchedulerRequest,
    settings: &ConnectionSettings,
    connector: &C,
    stdout: &mut W,
) -> Result<(), AppError>
where
    C: Connector,
    W: Write,
{
    let mut session = connector.connect(settings)?;
    debug!(operation = %request.operation(), "calling scheduler");
    match request {
        SchedulerRequest::Reload(input) => {
            session.reload(input)?;
        }
        SchedulerRequest::Stop(input) => {
            session.stop(input)?;
        }
        SchedulerRequest::ListPrograms { input, format } => {
            let output = session.get_programs(input)?;
            write_lines(stdout, &output.programs, format)?;
        }
        SchedulerRequest::AddTid(input) => {
            let output = session.add_tid(input)?;
            info!(tid = output.tid, title = %output.title, "tracking title");
        }
        SchedulerRequest::Update(input) => {
            session.update(input)?;
        }
        SchedulerRequest::AddChannel(input) => {
            session.add_channel(input)?;
        }
    }
    Ok(())
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_connector(args, stdout, stderr, &GrpcConnector)
}

/// Runs the CLI with a custom scheduler connector.
#[must_use]
pub(crate) fn run_with_connector<I, W, E, C>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    connector: &C,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    C: Connector,
{
    CliRunner::new(IoStreams::new(stdout, stderr), connector).run(args)
}
