//! Build-time helpers for rendering the `kaede-cli` manual page.
//!
//! Build scripts call these to derive a reproducible page date, locate the
//! workspace `target/` directory from `OUT_DIR`, and write the rendered page
//! atomically.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};
use time::OffsetDateTime;

const FALLBACK_DATE: &str = "1970-01-01";

enum SourceDateError {
    Missing,
    InvalidInteger { raw: String },
    InvalidTimestamp { raw: String },
}

/// Derives the manual page date from a `SOURCE_DATE_EPOCH` value.
///
/// Invalid values fall back to the Unix epoch and push a warning, without the
/// `cargo:warning=` prefix, so the caller decides how to emit it.
///
/// # Examples
/// ```
/// use kaede_build_util::manual_date;
///
/// let mut warnings = Vec::new();
/// assert_eq!(manual_date(Some("86400"), &mut warnings), "1970-01-02");
/// assert_eq!(manual_date(Some("soon"), &mut warnings), "1970-01-01");
/// assert_eq!(warnings.len(), 1);
/// ```
pub fn manual_date(source_date_epoch: Option<&str>, warnings: &mut Vec<String>) -> String {
    let value = match parse_source_date(source_date_epoch) {
        Ok(value) => value,
        Err(error) => {
            push_source_date_warning(warnings, &error);
            return FALLBACK_DATE.into();
        }
    };

    format!(
        "{:04}-{:02}-{:02}",
        value.year(),
        u8::from(value.month()),
        value.day()
    )
}

/// Derives the manual page date from the `SOURCE_DATE_EPOCH` environment
/// variable.
pub fn manual_date_from_env(warnings: &mut Vec<String>) -> String {
    let raw = env::var("SOURCE_DATE_EPOCH").ok();
    manual_date(raw.as_deref(), warnings)
}

fn parse_source_date(raw: Option<&str>) -> Result<OffsetDateTime, SourceDateError> {
    let raw = raw.ok_or(SourceDateError::Missing)?;
    let timestamp = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| SourceDateError::InvalidInteger { raw: raw.to_owned() })?;
    OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|_| SourceDateError::InvalidTimestamp { raw: raw.to_owned() })
}

fn push_source_date_warning(warnings: &mut Vec<String>, error: &SourceDateError) {
    match error {
        SourceDateError::Missing => {}
        SourceDateError::InvalidInteger { raw } => warnings.push(format!(
            "Invalid SOURCE_DATE_EPOCH '{raw}'; expected integer seconds since Unix epoch; \
             falling back to {FALLBACK_DATE}"
        )),
        SourceDateError::InvalidTimestamp { raw } => warnings.push(format!(
            "Invalid SOURCE_DATE_EPOCH '{raw}'; not a valid Unix timestamp; falling back to \
             {FALLBACK_DATE}"
        )),
    }
}

/// Finds the workspace `target` directory that encloses `out_dir`.
///
/// `OUT_DIR` is `{workspace}/target/{profile}/build/{crate}-{hash}/out` for
/// native builds and gains a `{target}` component when cross-compiling.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use kaede_build_util::workspace_target_dir;
///
/// let out = Path::new("/work/target/release/build/kaede-cli-abc123/out");
/// assert_eq!(workspace_target_dir(out).as_deref(), Some(Path::new("/work/target")));
/// ```
#[must_use]
pub fn workspace_target_dir(out_dir: &Path) -> Option<PathBuf> {
    out_dir
        .ancestors()
        .find(|ancestor| ancestor.file_name().and_then(|name| name.to_str()) == Some("target"))
        .map(Path::to_path_buf)
}

/// Computes the directory that receives generated manual pages.
///
/// Falls back to a relative `target/` when `out_dir` is absent or does not
/// sit inside a workspace target directory.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use kaede_build_util::out_dir_for_target_profile;
///
/// let out = Path::new("/work/target/x86_64-unknown-linux-gnu/debug/build/kaede-cli-1/out");
/// let dir = out_dir_for_target_profile("x86_64-unknown-linux-gnu", "debug", Some(out));
/// assert!(dir.ends_with("generated-man/x86_64-unknown-linux-gnu/debug"));
/// assert!(dir.starts_with("/work/target"));
/// ```
#[must_use]
pub fn out_dir_for_target_profile(target: &str, profile: &str, out_dir: Option<&Path>) -> PathBuf {
    let base = out_dir
        .and_then(workspace_target_dir)
        .unwrap_or_else(|| PathBuf::from("target"));
    base.join("generated-man").join(target).join(profile)
}

/// Writes a manual page into `dir`, replacing any previous page atomically.
///
/// # Errors
///
/// Returns the underlying IO error when the directory cannot be created or
/// the page cannot be written or renamed into place.
pub fn write_man_page(data: &[u8], dir: &Path, page_name: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let destination = dir.join(page_name);
    let tmp = dir.join(format!("{page_name}.tmp"));
    fs::write(&tmp, data)?;
    if destination.exists() {
        fs::remove_file(&destination)?;
    }
    fs::rename(&tmp, &destination)?;
    Ok(destination)
}
