//! Outcome of running a candidate executable with a version query

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a probe did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ProbeFailure {
    NonZeroExit { code: i32 },
    Signal { signal: i32 },
    TimedOut { timeout_ms: u64 },
    SpawnFailed { message: String },
    InvalidOutput { message: String },
    RuntimeTooOld { major: u32, minimum: u32 },
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonZeroExit { code } => write!(f, "exited with code {code}"),
            Self::Signal { signal } => write!(f, "terminated by signal {signal}"),
            Self::TimedOut { timeout_ms } => write!(f, "timed out after {timeout_ms} ms"),
            Self::SpawnFailed { message } => write!(f, "could not be started: {message}"),
            Self::InvalidOutput { message } => write!(f, "printed unusable output: {message}"),
            Self::RuntimeTooOld { major, minimum } => {
                write!(f, "runtime major version {major} is older than {minimum}")
            }
        }
    }
}

/// Result of one probe run. Used once to decide between success and retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub success: bool,
    pub bundle_version: Option<String>,
    pub runtime_version: Option<String>,
    /// Effective major version of the runtime, `1.x` numbering normalized
    pub runtime_major: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<ProbeFailure>,
    /// Captured only when the probe failed
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

impl ProbeResult {
    #[must_use]
    pub fn succeeded(bundle_version: String, runtime_version: String, runtime_major: u32) -> Self {
        Self {
            success: true,
            bundle_version: Some(bundle_version),
            runtime_version: Some(runtime_version),
            runtime_major: Some(runtime_major),
            failure: None,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    #[must_use]
    pub fn failed(failure: ProbeFailure, stdout: String, stderr: String) -> Self {
        Self {
            success: false,
            bundle_version: None,
            runtime_version: None,
            runtime_major: None,
            failure: Some(failure),
            stdout,
            stderr,
        }
    }
}
