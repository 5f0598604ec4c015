//! Line rendering for scheduler responses.
//!
//! The dispatcher only knows that a record can become one line of text; the
//! [`RenderLine`] implementations decide what that line looks like.

use std::io::Write;

use kaede_proto::{Program, Timestamp};
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::cli::OutputFormat;
use crate::errors::AppError;

/// Human file names at or beyond this many bytes drop subtitle and comment.
const MAX_FILE_NAME_BYTES: usize = 200;

const SECONDS_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Errors raised while rendering a record.
#[derive(Debug, Error)]
pub(crate) enum RenderError {
    #[error("timestamp {seconds}s {nanos}ns is out of range")]
    Timestamp { seconds: i64, nanos: i32 },
    #[error("failed to serialise record: {0}")]
    Serialise(#[from] serde_json::Error),
}

/// A record that can be written as a single line of text.
pub(crate) trait RenderLine {
    fn render_line(&self, format: OutputFormat) -> Result<String, RenderError>;
}

/// Writes one line per record, in order.
///
/// Every record is rendered before anything is written, so a rendering
/// failure leaves the writer untouched.
pub(crate) fn write_lines<W, R>(
    writer: &mut W,
    records: &[R],
    format: OutputFormat,
) -> Result<(), AppError>
where
    W: Write,
    R: RenderLine,
{
    let lines = records
        .iter()
        .map(|record| record.render_line(format))
        .collect::<Result<Vec<_>, _>>()
        .map_err(AppError::RenderProgram)?;
    for line in lines {
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .map_err(AppError::WriteOutput)?;
    }
    writer.flush().map_err(AppError::WriteOutput)
}

impl RenderLine for Program {
    fn render_line(&self, format: OutputFormat) -> Result<String, RenderError> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string(&ProgramJson::try_from(self)?)?),
            OutputFormat::Human => {
                let start = self
                    .start_time
                    .as_ref()
                    .map(format_timestamp)
                    .transpose()?
                    .unwrap_or_else(|| String::from("-"));
                Ok(format!("{start} {}", recording_file_name(self)))
            }
        }
    }
}

/// Protobuf JSON mapping of [`Program`]: camelCase keys in tag order, zero
/// values omitted.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgramJson<'a> {
    #[serde(skip_serializing_if = "is_default")]
    pid: u32,
    #[serde(skip_serializing_if = "is_default")]
    tid: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<String>,
    #[serde(skip_serializing_if = "is_default")]
    channel_name: &'a str,
    #[serde(skip_serializing_if = "is_default")]
    channel_for_syoboi: u32,
    #[serde(skip_serializing_if = "is_default")]
    channel_for_recorder: u32,
    #[serde(skip_serializing_if = "is_default")]
    count: u32,
    #[serde(skip_serializing_if = "is_default")]
    start_offset: i32,
    #[serde(skip_serializing_if = "is_default")]
    subtitle: &'a str,
    #[serde(skip_serializing_if = "is_default")]
    title: &'a str,
    #[serde(skip_serializing_if = "is_default")]
    comment: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    enqueued_at: Option<String>,
}

impl<'a> TryFrom<&'a Program> for ProgramJson<'a> {
    type Error = RenderError;

    fn try_from(program: &'a Program) -> Result<Self, Self::Error> {
        let timestamp = |value: Option<&Timestamp>| value.map(format_timestamp).transpose();
        Ok(Self {
            pid: program.pid,
            tid: program.tid,
            start_time: timestamp(program.start_time.as_ref())?,
            end_time: timestamp(program.end_time.as_ref())?,
            channel_name: &program.channel_name,
            channel_for_syoboi: program.channel_for_syoboi,
            channel_for_recorder: program.channel_for_recorder,
            count: program.count,
            start_offset: program.start_offset,
            subtitle: &program.subtitle,
            title: &program.title,
            comment: &program.comment,
            enqueued_at: timestamp(program.enqueued_at.as_ref())?,
        })
    }
}

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// RFC 3339 in UTC with the fraction padded to 0, 3, 6 or 9 digits, as the
/// protobuf JSON mapping requires.
fn format_timestamp(timestamp: &Timestamp) -> Result<String, RenderError> {
    let out_of_range = || RenderError::Timestamp {
        seconds: timestamp.seconds,
        nanos: timestamp.nanos,
    };
    let nanos = u32::try_from(timestamp.nanos).map_err(|_| out_of_range())?;
    let value = OffsetDateTime::from_unix_timestamp(timestamp.seconds)
        .and_then(|value| value.replace_nanosecond(nanos))
        .map_err(|_| out_of_range())?;
    if !(1..=9999).contains(&value.year()) {
        return Err(out_of_range());
    }
    let seconds = value.format(SECONDS_FORMAT).map_err(|_| out_of_range())?;
    let fraction = match nanos {
        0 => String::new(),
        _ if nanos % 1_000_000 == 0 => format!(".{:03}", nanos / 1_000_000),
        _ if nanos % 1_000 == 0 => format!(".{:06}", nanos / 1_000),
        _ => format!(".{nanos:09}"),
    };
    Ok(format!("{seconds}{fraction}Z"))
}

/// The scheduler's recording file name for `program`.
///
/// Slashes become U+FF0F so the name stays a single path component. The
/// length limit applies to the name after that substitution.
pub(crate) fn recording_file_name(program: &Program) -> String {
    let Program {
        pid,
        tid,
        count,
        title,
        subtitle,
        comment,
        channel_name,
        ..
    } = program;
    let mut name = format!("{tid}_{pid} {title} #{count} {subtitle}");
    if !comment.is_empty() {
        name.push_str(&format!(" ({comment})"));
    }
    name.push_str(&format!(" at {channel_name}"));
    let name = name.replace('/', "\u{ff0f}");
    if name.len() < MAX_FILE_NAME_BYTES {
        return name;
    }
    format!("{tid}_{pid} {title} #{count} at {channel_name}").replace('/', "\u{ff0f}")
}
