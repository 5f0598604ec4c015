//! Error types and diagnostics helpers for the CLI runtime.

use std::error::Error as StdError;
use std::io;
use std::num::ParseIntError;

use thiserror::Error;

use crate::command::RemoteOperation;
use crate::output::RenderError;
use crate::telemetry::TelemetryError;

/// Boxed error carried by transport failures.
pub(crate) type TransportError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("no subcommand given")]
    NoSubcommand,
    #[error("add-tid requires 1 argument")]
    MissingTid,
    #[error("invalid tid '{value}': {source}")]
    InvalidTid {
        value: String,
        source: ParseIntError,
    },
    #[error("--recorder is required")]
    MissingRecorder,
    #[error("--syoboi is required")]
    MissingSyoboi,
    #[error("name is required")]
    MissingChannelName,
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("invalid scheduler address '{address}': {source}")]
    InvalidAddress {
        address: String,
        source: TransportError,
    },
    #[error("failed to start the client runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("failed to connect to scheduler at {address}: {source}")]
    Connect {
        address: String,
        source: TransportError,
    },
    #[error("{operation} failed: {:?}: {}", .status.code(), .status.message())]
    Remote {
        operation: RemoteOperation,
        status: Box<tonic::Status>,
    },
    #[error("failed to render program: {0}")]
    RenderProgram(#[source] RenderError),
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] io::Error),
}

impl AppError {
    pub(crate) fn remote(operation: RemoteOperation, status: tonic::Status) -> Self {
        Self::Remote {
            operation,
            status: Box::new(status),
        }
    }
}

/// Renders an error followed by any source whose text it does not already
/// include.
///
/// Transport errors nest the useful detail (for example `Connection refused`)
/// a few sources deep, so printing only the top-level message hides it.
pub(crate) fn render_error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut rendered = error.to_string().trim_end().to_owned();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !rendered.contains(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        source = cause.source();
    }
    rendered
}
