//! Platform and process execution errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Errors that can occur during platform-specific operations
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PlatformError {
    #[error("process execution failed: {command} - {message}")]
    ProcessExecutionFailed { command: String, message: String },

    #[error("process {command} timed out after {timeout_ms}ms")]
    ProcessTimedOut { command: String, timeout_ms: u64 },

    #[error("unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("home directory could not be determined")]
    HomeDirUnavailable,
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ProcessTimedOut { .. } => {
                Some("The runtime may be starting slowly; increase probe.timeout_ms.")
            }
            Self::UnsupportedPlatform { .. } => {
                Some("Configure runtime.path to point at an installed runtime.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::ProcessTimedOut { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ProcessExecutionFailed { .. } => "platform.process_execution_failed",
            Self::ProcessTimedOut { .. } => "platform.process_timed_out",
            Self::UnsupportedPlatform { .. } => "platform.unsupported_platform",
            Self::HomeDirUnavailable => "platform.home_dir_unavailable",
        };
        Some(code)
    }
}
