//! Command modelling for scheduler requests.
//!
//! This module turns parsed CLI arguments into exactly one validated
//! scheduler request. Validation happens here so the runtime never opens a
//! connection for an invocation that cannot be sent.

use std::fmt;

use kaede_proto::{
    AddChannelInput, AddTidInput, GetProgramsInput, SchedulerReloadInput, SchedulerStopInput,
    UpdateInput,
};

use crate::cli::{AddChannelArgs, AddTidArgs, CliCommand, OutputFormat};
use crate::errors::AppError;

/// Remote methods of the scheduler service.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum RemoteOperation {
    Reload,
    Stop,
    GetPrograms,
    AddTid,
    Update,
    AddChannel,
}

impl RemoteOperation {
    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::Reload => "Reload",
            Self::Stop => "Stop",
            Self::GetPrograms => "GetPrograms",
            Self::AddTid => "AddTid",
            Self::Update => "Update",
            Self::AddChannel => "AddChannel",
        }
    }
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SchedulerRequest {
    Reload(SchedulerReloadInput),
    Stop(SchedulerStopInput),
    ListPrograms {
        input: GetProgramsInput,
        format: OutputFormat,
    },
    AddTid(AddTidInput),
    Update(UpdateInput),
    AddChannel(AddChannelInput),
}

impl SchedulerRequest {
    pub(crate) const fn operation(&self) -> RemoteOperation {
        match self {
            Self::Reload(_) => RemoteOperation::Reload,
            Self::Stop(_) => RemoteOperation::Stop,
            Self::ListPrograms { .. } => RemoteOperation::GetPrograms,
            Self::AddTid(_) => RemoteOperation::AddTid,
            Self::Update(_) => RemoteOperation::Update,
            Self::AddChannel(_) => RemoteOperation::AddChannel,
        }
    }
}

/// A validated request together with the scheduler it is addressed to.
#[derive(Debug)]
pub(crate) struct CommandInvocation {
    pub(crate) address: String,
    pub(crate) request: SchedulerRequest,
}

impl TryFrom<CliCommand> for CommandInvocation {
    type Error = AppError;

    fn try_from(command: CliCommand) -> Result<Self, Self::Error> {
        let address = command.address().to_owned();
        let request = match command {
            CliCommand::Reload(_) => SchedulerRequest::Reload(SchedulerReloadInput {}),
            CliCommand::Stop(_) => SchedulerRequest::Stop(SchedulerStopInput {}),
            CliCommand::ListPrograms(args) => SchedulerRequest::ListPrograms {
                input: GetProgramsInput {},
                format: args.format,
            },
            CliCommand::AddTid(args) => SchedulerRequest::AddTid(add_tid_input(args)?),
            CliCommand::Update(_) => SchedulerRequest::Update(UpdateInput {}),
            CliCommand::AddChannel(args) => {
                SchedulerRequest::AddChannel(add_channel_input(args)?)
            }
        };
        Ok(Self { address, request })
    }
}

fn add_tid_input(args: AddTidArgs) -> Result<AddTidInput, AppError> {
    let value = args
        .tid
        .filter(|tid| !tid.is_empty())
        .ok_or(AppError::MissingTid)?;
    let tid = value
        .parse::<u32>()
        .map_err(|source| AppError::InvalidTid { value, source })?;
    Ok(AddTidInput { tid })
}

fn add_channel_input(args: AddChannelArgs) -> Result<AddChannelInput, AppError> {
    let recorder = args
        .recorder
        .filter(|recorder| *recorder != 0)
        .ok_or(AppError::MissingRecorder)?;
    let syoboi = args
        .syoboi
        .filter(|syoboi| *syoboi != 0)
        .ok_or(AppError::MissingSyoboi)?;
    let name = args
        .name
        .filter(|name| !name.is_empty())
        .ok_or(AppError::MissingChannelName)?;
    Ok(AddChannelInput {
        name,
        recorder,
        syoboi,
    })
}
