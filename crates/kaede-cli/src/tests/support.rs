//! Test support utilities for kaede CLI coverage.
//!
//! Supplies an in-process scheduler that records every connection attempt and
//! remote call, plus a world type that runs the CLI against it and captures
//! its output.

use std::cell::{Ref, RefCell, RefMut};
use std::ffi::OsString;
use std::io;
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{Context, ensure};
use kaede_proto::{
    AddChannelInput, AddChannelOutput, AddTidInput, AddTidOutput, GetProgramsInput,
    GetProgramsOutput, Program, SchedulerReloadInput, SchedulerReloadOutput, SchedulerStopInput,
    SchedulerStopOutput, UpdateInput, UpdateOutput,
};
use rstest::fixture;
use tonic::{Code, Status};

use crate::command::RemoteOperation;
use crate::errors::AppError;
use crate::run_with_connector;
use crate::transport::{ConnectionSettings, Connector, Scheduler};

/// A remote call as observed by the fake scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum RecordedCall {
    Reload,
    Stop,
    GetPrograms,
    AddTid {
        tid: u32,
    },
    Update,
    AddChannel {
        name: String,
        recorder: u32,
        syoboi: u32,
    },
}

impl RecordedCall {
    pub(super) const fn operation(&self) -> RemoteOperation {
        match self {
            Self::Reload => RemoteOperation::Reload,
            Self::Stop => RemoteOperation::Stop,
            Self::GetPrograms => RemoteOperation::GetPrograms,
            Self::AddTid { .. } => RemoteOperation::AddTid,
            Self::Update => RemoteOperation::Update,
            Self::AddChannel { .. } => RemoteOperation::AddChannel,
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct SchedulerState {
    pub(super) connection_attempts: Vec<ConnectionSettings>,
    pub(super) calls: Vec<RecordedCall>,
    pub(super) programs: Vec<Program>,
    pub(super) unreachable: bool,
    pub(super) rejection: Option<(Code, String)>,
}

/// In-process scheduler standing in for the gRPC service.
#[derive(Debug, Clone, Default)]
pub(super) struct FakeScheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl FakeScheduler {
    pub(super) fn state(&self) -> Ref<'_, SchedulerState> {
        self.state.borrow()
    }

    pub(super) fn state_mut(&self) -> RefMut<'_, SchedulerState> {
        self.state.borrow_mut()
    }
}

impl Connector for FakeScheduler {
    type Session = FakeSession;

    fn connect(&self, settings: &ConnectionSettings) -> Result<FakeSession, AppError> {
        let mut state = self.state.borrow_mut();
        state.connection_attempts.push(settings.clone());
        if state.unreachable {
            return Err(AppError::Connect {
                address: settings.address.clone(),
                source: Box::new(io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    "connection refused",
                )),
            });
        }
        Ok(FakeSession {
            state: Rc::clone(&self.state),
        })
    }
}

pub(super) struct FakeSession {
    state: Rc<RefCell<SchedulerState>>,
}

impl FakeSession {
    fn record<T>(&self, call: RecordedCall, reply: T) -> Result<T, AppError> {
        let mut state = self.state.borrow_mut();
        let operation = call.operation();
        state.calls.push(call);
        match &state.rejection {
            Some((code, message)) => Err(AppError::remote(
                operation,
                Status::new(*code, message.clone()),
            )),
            None => Ok(reply),
        }
    }
}

impl Scheduler for FakeSession {
    fn reload(&mut self, _input: SchedulerReloadInput) -> Result<SchedulerReloadOutput, AppError> {
        self.record(RecordedCall::Reload, SchedulerReloadOutput {})
    }

    fn stop(&mut self, _input: SchedulerStopInput) -> Result<SchedulerStopOutput, AppError> {
        self.record(RecordedCall::Stop, SchedulerStopOutput {})
    }

    fn get_programs(&mut self, _input: GetProgramsInput) -> Result<GetProgramsOutput, AppError> {
        let programs = self.state.borrow().programs.clone();
        self.record(RecordedCall::GetPrograms, GetProgramsOutput { programs })
    }

    fn add_tid(&mut self, input: AddTidInput) -> Result<AddTidOutput, AppError> {
        let reply = AddTidOutput {
            tid: input.tid,
            title: format!("Title {}", input.tid),
        };
        self.record(RecordedCall::AddTid { tid: input.tid }, reply)
    }

    fn update(&mut self, _input: UpdateInput) -> Result<UpdateOutput, AppError> {
        self.record(RecordedCall::Update, UpdateOutput {})
    }

    fn add_channel(&mut self, input: AddChannelInput) -> Result<AddChannelOutput, AppError> {
        let call = RecordedCall::AddChannel {
            name: input.name,
            recorder: input.recorder,
            syoboi: input.syoboi,
        };
        self.record(call, AddChannelOutput {})
    }
}

/// Programs with pids `1..=count`, titled after their pid.
pub(super) fn sample_programs(count: u32) -> Vec<Program> {
    (1..=count)
        .map(|pid| Program {
            pid,
            tid: 6000 + pid,
            channel_name: String::from("MX"),
            title: format!("Program {pid}"),
            ..Program::default()
        })
        .collect()
}

/// Test world holding the fake scheduler and captured CLI output.
#[derive(Default)]
pub(super) struct TestWorld {
    pub(super) scheduler: FakeScheduler,
    pub(super) stdout: Vec<u8>,
    pub(super) stderr: Vec<u8>,
    pub(super) exit_code: Option<ExitCode>,
}

impl TestWorld {
    pub(super) fn run(&mut self, command: &str) {
        self.stdout.clear();
        self.stderr.clear();
        let args = build_args(command);
        let exit = run_with_connector(args, &mut self.stdout, &mut self.stderr, &self.scheduler);
        self.exit_code = Some(exit);
    }

    pub(super) fn stdout_text(&self) -> anyhow::Result<String> {
        String::from_utf8(self.stdout.clone()).context("stdout utf8")
    }

    pub(super) fn stderr_text(&self) -> anyhow::Result<String> {
        String::from_utf8(self.stderr.clone()).context("stderr utf8")
    }

    pub(super) fn assert_exit_code(&self, expected: ExitCode) -> anyhow::Result<()> {
        let exit = self.exit_code.context("exit code not recorded")?;
        ensure!(exit == expected, "expected exit {expected:?}, got {exit:?}");
        Ok(())
    }

    pub(super) fn calls(&self) -> Vec<RecordedCall> {
        self.scheduler.state().calls.clone()
    }

    pub(super) fn connection_attempts(&self) -> usize {
        self.scheduler.state().connection_attempts.len()
    }
}

/// Splits a command line into CLI arguments, prefixed with the binary name.
pub(super) fn build_args(command: &str) -> Vec<OsString> {
    let mut args = vec![OsString::from("kaede-cli")];
    let trimmed = command.trim().trim_matches('"');
    if !trimmed.is_empty() {
        args.extend(
            trimmed
                .split_whitespace()
                .map(|token| OsString::from(token.trim_matches('"'))),
        );
    }
    args
}

#[fixture]
pub(super) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}
