//! CLI argument definitions for kaede-cli.
//!
//! This module defines the command-line interface structure used by both the
//! runtime parser and the build script for manpage generation, so it must not
//! reference other crate modules.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Scheduler address used when `--address` is not supplied.
pub(crate) const DEFAULT_ADDRESS: &str = "localhost:4195";
/// Tracing filter applied when `--log-filter` is not supplied.
pub(crate) const DEFAULT_LOG_FILTER: &str = "warn";
/// Seconds allowed for establishing the scheduler connection.
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Rendering used by `list-programs`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// One protobuf-JSON object per line.
    #[default]
    Json,
    /// One recording file name per line, prefixed by the start time.
    Human,
}

/// Diagnostic log line format.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable single line output.
    #[default]
    Compact,
    /// Structured JSON suitable for ingestion by logging stacks.
    Json,
}

/// Command-line interface for the kaede scheduler.
#[derive(Parser, Debug)]
#[command(
    name = "kaede-cli",
    version,
    about = "CLI for kaede",
    disable_help_subcommand = true
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) global: GlobalArgs,
    /// The scheduler operation to invoke.
    #[command(subcommand)]
    pub(crate) command: Option<CliCommand>,
}

/// Flags accepted before or after any subcommand.
#[derive(Args, Debug, Clone)]
pub(crate) struct GlobalArgs {
    /// Tracing filter for diagnostics written to stderr.
    #[arg(long, global = true, value_name = "FILTER", default_value = DEFAULT_LOG_FILTER)]
    pub(crate) log_filter: String,
    /// Format of diagnostics written to stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub(crate) log_format: LogFormat,
    /// Seconds to wait while connecting to the scheduler.
    #[arg(
        long,
        global = true,
        value_name = "SECONDS",
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS
    )]
    pub(crate) connect_timeout: u64,
    /// Deadline in seconds for the scheduler call; waits indefinitely when unset.
    #[arg(long, global = true, value_name = "SECONDS")]
    pub(crate) timeout: Option<u64>,
}

/// Scheduler operations.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Reload scheduler
    Reload(TargetArgs),
    /// Stop scheduler
    Stop(TargetArgs),
    /// List programs
    ListPrograms(ListProgramsArgs),
    /// Add tid
    AddTid(AddTidArgs),
    /// Update
    Update(TargetArgs),
    /// Add channel
    AddChannel(AddChannelArgs),
}

/// Scheduler address selection.
#[derive(Args, Debug, Clone)]
pub(crate) struct TargetArgs {
    /// Scheduler address as host:port.
    #[arg(short = 'a', long, value_name = "ADDR", default_value = DEFAULT_ADDRESS)]
    pub(crate) address: String,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ListProgramsArgs {
    #[command(flatten)]
    pub(crate) target: TargetArgs,
    /// How each program is rendered.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct AddTidArgs {
    #[command(flatten)]
    pub(crate) target: TargetArgs,
    /// Syoboi Calendar title id to track.
    #[arg(value_name = "TID")]
    pub(crate) tid: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct AddChannelArgs {
    #[command(flatten)]
    pub(crate) target: TargetArgs,
    /// Channel number understood by the recorder.
    #[arg(long, value_name = "N")]
    pub(crate) recorder: Option<u32>,
    /// Channel id used by Syoboi Calendar.
    #[arg(long, value_name = "N")]
    pub(crate) syoboi: Option<u32>,
    /// Channel name.
    #[arg(value_name = "NAME")]
    pub(crate) name: Option<String>,
}

impl CliCommand {
    /// Address of the scheduler the command targets.
    #[allow(
        dead_code,
        reason = "used by lib.rs but not by build.rs which #[path]-includes cli.rs"
    )]
    pub(crate) fn address(&self) -> &str {
        match self {
            Self::Reload(target) | Self::Stop(target) | Self::Update(target) => &target.address,
            Self::ListPrograms(args) => &args.target.address,
            Self::AddTid(args) => &args.target.address,
            Self::AddChannel(args) => &args.target.address,
        }
    }
}
