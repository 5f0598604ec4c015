//! Connection handling for the scheduler service.
//!
//! [`Connector`] opens one [`Scheduler`] session per invocation. The gRPC
//! implementation drives tonic on a current-thread Tokio runtime owned by the
//! session, so callers stay synchronous and the channel is closed when the
//! session is dropped.

use std::time::Duration;

use kaede_proto::scheduler_client::SchedulerClient;
use kaede_proto::{
    AddChannelInput, AddChannelOutput, AddTidInput, AddTidOutput, GetProgramsInput,
    GetProgramsOutput, SchedulerReloadInput, SchedulerReloadOutput, SchedulerStopInput,
    SchedulerStopOutput, UpdateInput, UpdateOutput,
};
use tokio::runtime::{Builder, Runtime};
use tonic::transport::{Channel, Endpoint};
use tonic::{Response, Status};
use tracing::debug;

use crate::cli::GlobalArgs;
use crate::command::RemoteOperation;
use crate::errors::AppError;

/// How to reach the scheduler for a single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConnectionSettings {
    pub(crate) address: String,
    pub(crate) connect_timeout: Duration,
    pub(crate) request_timeout: Option<Duration>,
}

impl ConnectionSettings {
    pub(crate) fn new(address: impl Into<String>, global: &GlobalArgs) -> Self {
        Self {
            address: address.into(),
            connect_timeout: Duration::from_secs(global.connect_timeout),
            request_timeout: global.timeout.map(Duration::from_secs),
        }
    }

    /// URI handed to tonic; bare `host:port` addresses use plaintext HTTP/2.
    pub(crate) fn endpoint_uri(&self) -> String {
        if self.address.contains("://") {
            self.address.clone()
        } else {
            format!("http://{}", self.address)
        }
    }
}

/// The six remote operations of the scheduler.
pub(crate) trait Scheduler {
    fn reload(&mut self, input: SchedulerReloadInput) -> Result<SchedulerReloadOutput, AppError>;

    fn stop(&mut self, input: SchedulerStopInput) -> Result<SchedulerStopOutput, AppError>;

    fn get_programs(&mut self, input: GetProgramsInput) -> Result<GetProgramsOutput, AppError>;

    fn add_tid(&mut self, input: AddTidInput) -> Result<AddTidOutput, AppError>;

    fn update(&mut self, input: UpdateInput) -> Result<UpdateOutput, AppError>;

    fn add_channel(&mut self, input: AddChannelInput) -> Result<AddChannelOutput, AppError>;
}

/// Opens scheduler sessions.
pub(crate) trait Connector {
    type Session: Scheduler;

    /// Connects eagerly; a session is only returned once the scheduler is
    /// reachable.
    fn connect(&self, settings: &ConnectionSettings) -> Result<Self::Session, AppError>;
}

/// Connects over gRPC with tonic.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct GrpcConnector;

impl Connector for GrpcConnector {
    type Session = GrpcSession;

    fn connect(&self, settings: &ConnectionSettings) -> Result<GrpcSession, AppError> {
        let mut endpoint = Endpoint::from_shared(settings.endpoint_uri())
            .map_err(|source| AppError::InvalidAddress {
                address: settings.address.clone(),
                source: Box::new(source),
            })?
            .connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            endpoint = endpoint.timeout(timeout);
        }

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(AppError::Runtime)?;

        debug!(address = %settings.address, "connecting to scheduler");
        let client = runtime
            .block_on(SchedulerClient::connect(endpoint))
            .map_err(|source| AppError::Connect {
                address: settings.address.clone(),
                source: Box::new(source),
            })?;
        debug!(address = %settings.address, "connected to scheduler");

        Ok(GrpcSession { client, runtime })
    }
}

/// A live gRPC connection.
///
/// Field order matters: the client (and its channel) must drop before the
/// runtime that drives it.
pub(crate) struct GrpcSession {
    client: SchedulerClient<Channel>,
    runtime: Runtime,
}

fn into_message<T>(
    operation: RemoteOperation,
    result: Result<Response<T>, Status>,
) -> Result<T, AppError> {
    debug!(%operation, ok = result.is_ok(), "scheduler call finished");
    result
        .map(Response::into_inner)
        .map_err(|status| AppError::remote(operation, status))
}

impl Scheduler for GrpcSession {
    fn reload(&mut self, input: SchedulerReloadInput) -> Result<SchedulerReloadOutput, AppError> {
        let result = self.runtime.block_on(self.client.reload(input));
        into_message(RemoteOperation::Reload, result)
    }

    fn stop(&mut self, input: SchedulerStopInput) -> Result<SchedulerStopOutput, AppError> {
        let result = self.runtime.block_on(self.client.stop(input));
        into_message(RemoteOperation::Stop, result)
    }

    fn get_programs(&mut self, input: GetProgramsInput) -> Result<GetProgramsOutput, AppError> {
        let result = self.runtime.block_on(self.client.get_programs(input));
        into_message(RemoteOperation::GetPrograms, result)
    }

    fn add_tid(&mut self, input: AddTidInput) -> Result<AddTidOutput, AppError> {
        let result = self.runtime.block_on(self.client.add_tid(input));
        into_message(RemoteOperation::AddTid, result)
    }

    fn update(&mut self, input: UpdateInput) -> Result<UpdateOutput, AppError> {
        let result = self.runtime.block_on(self.client.update(input));
        into_message(RemoteOperation::Update, result)
    }

    fn add_channel(&mut self, input: AddChannelInput) -> Result<AddChannelOutput, AppError> {
        let result = self.runtime.block_on(self.client.add_channel(input));
        into_message(RemoteOperation::AddChannel, result)
    }
}
