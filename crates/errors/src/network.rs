//! Network-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum NetworkError {
    #[error("connection timeout to {url}")]
    Timeout { url: String },

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("request to {url} failed with status code {status}")]
    HttpError { url: String, status: u16 },

    #[error("received redirect status {status} from {url} without a Location header")]
    RedirectWithoutLocation { url: String, status: u16 },

    #[error("too many redirects while fetching {url}")]
    TooManyRedirects { url: String },

    #[error("unexpected content type {content_type} from {url}")]
    UnexpectedContentType { url: String, content_type: String },

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("invalid response body from {url}: {message}")]
    InvalidBody { url: String, message: String },
}

impl UserFacingError for NetworkError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Timeout { .. } | Self::ConnectionRefused(_) | Self::DownloadFailed(_) => {
                Some("Check your network connection or use the offline installation.")
            }
            Self::HttpError { status, .. } if *status == 403 || *status == 429 => {
                Some("Set a GitHub token in the configured token environment variable.")
            }
            Self::ChecksumMismatch { .. } => {
                Some("The download was corrupted or tampered with; retry the installation.")
            }
            Self::RedirectWithoutLocation { .. } | Self::TooManyRedirects { .. } => {
                Some("The release server responded unexpectedly; retry later.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::DownloadFailed(_)
                | Self::ConnectionRefused(_)
                | Self::ChecksumMismatch { .. }
        ) || matches!(self, Self::HttpError { status, .. } if *status >= 500 || *status == 429)
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Timeout { .. } => "network.timeout",
            Self::DownloadFailed(_) => "network.download_failed",
            Self::ConnectionRefused(_) => "network.connection_refused",
            Self::InvalidUrl(_) => "network.invalid_url",
            Self::HttpError { .. } => "network.http_error",
            Self::RedirectWithoutLocation { .. } => "network.redirect_without_location",
            Self::TooManyRedirects { .. } => "network.too_many_redirects",
            Self::UnexpectedContentType { .. } => "network.unexpected_content_type",
            Self::ChecksumMismatch { .. } => "network.checksum_mismatch",
            Self::InvalidBody { .. } => "network.invalid_body",
        };
        Some(code)
    }
}
