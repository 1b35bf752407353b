//! Collaborators around the LLVM profiling toolchain: running an
//! instrumented executable to produce a raw profile, and shelling out to
//! `llvm-profdata` to inspect it.
//!
//! These are thin subprocess wrappers with no parsing logic of their own;
//! everything here feeds the parsers in [`crate::parse`]. See:
//! <https://clang.llvm.org/docs/SourceBasedCodeCoverage.html>

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Symbol prefix emitted into every binary built with
/// `-fprofile-instr-generate`. A simple hello world contains ~34 instances;
/// requiring a handful guards against scanning an uninstrumented binary.
const INSTRUMENTATION_MARKER: &[u8] = b"__llvm_profile";
const MIN_MARKER_COUNT: usize = 10;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Executable not found at {0}")]
    MissingExecutable(PathBuf),
    #[error(
        "No coverage data found in {0}. Ensure the \"-fprofile-instr-generate -fcoverage-mapping\" build flags are used"
    )]
    NotInstrumented(PathBuf),
    #[error("Raw coverage was not saved to {0}")]
    NoProfileWritten(PathBuf),
    #[error("Profiling tool error: {0}")]
    Tool(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Metadata persisted next to a recorded profile as `<output>.meta.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Executable that produced the profile.
    pub executable: String,
    /// SHA-256 of the executable, so later diffs can tell which build ran.
    pub sha256: String,
    /// RFC3339 timestamp of the recording.
    pub recorded_at: String,
}

/// Sidecar path for a profile's run metadata.
pub fn metadata_path(output: &Path) -> PathBuf {
    let mut os = output.as_os_str().to_os_string();
    os.push(".meta.json");
    PathBuf::from(os)
}

/// Run `executable` with any `args`, directing its raw coverage profile to
/// `output` via the `LLVM_PROFILE_FILE` environment variable.
///
/// Fails up front when the executable is missing or was not built with
/// instrumentation, and afterwards when no profile file appeared. A stale
/// output file is deleted before the run. Returns the run metadata, which is
/// also written to [`metadata_path`].
///
/// Tests can set `COVDIFF_FAKE_PROFILE` to a file whose bytes are copied to
/// `output` instead of running the executable.
pub fn record_raw_profile(
    executable: &Path,
    args: &[String],
    output: &Path,
) -> Result<RunMetadata, ProfileError> {
    if !executable.is_file() {
        return Err(ProfileError::MissingExecutable(executable.to_path_buf()));
    }

    let executable_bytes = fs::read(executable)?;
    if count_occurrences(&executable_bytes, INSTRUMENTATION_MARKER) < MIN_MARKER_COUNT {
        return Err(ProfileError::NotInstrumented(executable.to_path_buf()));
    }

    // Only the presence of the output file after the run tells us recording
    // worked, so make sure a stale one cannot satisfy that check.
    if output.is_file() {
        fs::remove_file(output)?;
    }

    if let Some(fake) = std::env::var_os("COVDIFF_FAKE_PROFILE") {
        fs::copy(&fake, output)?;
    } else {
        let run = Command::new(executable)
            .args(args)
            .env("LLVM_PROFILE_FILE", output)
            .output()
            .map_err(|e| {
                ProfileError::Tool(format!("failed to run {}: {e}", executable.display()))
            })?;
        if !output.is_file() {
            let stderr = String::from_utf8_lossy(&run.stderr);
            let detail = stderr.trim();
            if !detail.is_empty() {
                return Err(ProfileError::Tool(format!(
                    "raw coverage was not saved to {}: {detail}",
                    output.display()
                )));
            }
            return Err(ProfileError::NoProfileWritten(output.to_path_buf()));
        }
    }

    if !output.is_file() {
        return Err(ProfileError::NoProfileWritten(output.to_path_buf()));
    }

    let metadata = RunMetadata {
        executable: executable.display().to_string(),
        sha256: format!("{:x}", Sha256::digest(&executable_bytes)),
        recorded_at: Utc::now().to_rfc3339(),
    };
    let body = serde_json::to_string_pretty(&metadata)
        .map_err(|e| ProfileError::Tool(format!("failed to serialize run metadata: {e}")))?;
    fs::write(metadata_path(output), body)?;

    Ok(metadata)
}

/// Wrapper around the `llvm-profdata` tool.
pub struct LlvmToolchain {
    profdata: PathBuf,
}

impl LlvmToolchain {
    pub fn new(profdata: impl Into<PathBuf>) -> Self {
        Self { profdata: profdata.into() }
    }

    /// Resolve the tool path: `LLVM_PROFDATA` env var, else `llvm-profdata`
    /// on PATH.
    pub fn resolve() -> Self {
        let profdata = std::env::var_os("LLVM_PROFDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("llvm-profdata"));
        Self { profdata }
    }

    /// Merge a raw profile into an indexed one (`llvm-profdata merge -sparse`).
    pub fn merge(&self, raw: &Path, indexed: &Path) -> Result<(), ProfileError> {
        // When show output is faked for tests there is nothing to merge.
        if std::env::var_os("COVDIFF_FAKE_PROFDATA_TEXT").is_some() {
            return Ok(());
        }
        run_tool(
            Command::new(&self.profdata).arg("merge").arg("-sparse").arg(raw).arg("-o").arg(indexed),
            "llvm-profdata merge",
        )?;
        Ok(())
    }

    /// Dump all function counters as text
    /// (`llvm-profdata show --all-functions --text`); the raw-profile
    /// parser's input. Works on both raw and indexed profiles.
    ///
    /// Tests can set `COVDIFF_FAKE_PROFDATA_TEXT` to a file whose contents
    /// are returned instead of invoking the tool.
    pub fn show_text(&self, profile: &Path) -> Result<String, ProfileError> {
        if let Some(fake) = std::env::var_os("COVDIFF_FAKE_PROFDATA_TEXT") {
            return Ok(fs::read_to_string(&fake)?);
        }
        let output = run_tool(
            Command::new(&self.profdata)
                .arg("show")
                .arg("--all-functions")
                .arg("--text")
                .arg(profile),
            "llvm-profdata show",
        )?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

fn run_tool(command: &mut Command, what: &str) -> Result<std::process::Output, ProfileError> {
    let output = command
        .output()
        .map_err(|e| ProfileError::Tool(format!("failed to spawn {what}: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProfileError::Tool(format!(
            "{what} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(output)
}

fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    if needle.is_empty() || haystack.len() < needle.len() {
        return 0;
    }
    haystack.windows(needle.len()).filter(|window| *window == needle).count()
}
