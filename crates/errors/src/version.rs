//! Version parsing and selection error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum VersionError {
    #[error("invalid version: {input}")]
    InvalidVersion { input: String },

    #[error("no candidate version satisfies {policy} among [{candidates}]")]
    NoSatisfyingVersion { policy: String, candidates: String },

    #[error("version parse error: {message}")]
    ParseError { message: String },
}

impl UserFacingError for VersionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidVersion { .. } | Self::ParseError { .. } => {
                Some("Use semantic-version strings like 1.2.3.")
            }
            Self::NoSatisfyingVersion { .. } => {
                Some("Raise bundle.max_version or remove it to select the latest release.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidVersion { .. } => "version.invalid_version",
            Self::NoSatisfyingVersion { .. } => "version.no_satisfying_version",
            Self::ParseError { .. } => "version.parse_error",
        };
        Some(code)
    }
}
