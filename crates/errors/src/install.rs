//! Installation pipeline error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum InstallError {
    #[error("could not create library directory {path}: {message}")]
    LibraryDirUnavailable { path: String, message: String },

    #[error("temporary file error: {message}")]
    TempFileError { message: String },

    #[error("extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("no directory found after extracting {archive}")]
    NoDirectoryAfterExtraction { archive: String },

    #[error("unsupported archive: {path}")]
    UnsupportedArchive { path: String },

    #[error("no hash digest known for {file_name}")]
    DigestNotFound { file_name: String },

    #[error("could not download or extract {name}: {message}")]
    BundleAcquisitionFailed { name: String, message: String },

    #[error("could not find a working runtime after {attempts} attempts")]
    RuntimeResolutionFailed { attempts: usize },

    #[error("filesystem operation failed: {operation} on {path}: {message}")]
    FilesystemError {
        operation: String,
        path: String,
        message: String,
    },

    #[error("{path} failed validation: {reason}")]
    ValidationFailed { path: String, reason: String },
}

impl InstallError {
    /// Errors that abort the whole installation instead of falling through to
    /// the next resolution tier.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::LibraryDirUnavailable { .. } | Self::TempFileError { .. }
        )
    }
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::LibraryDirUnavailable { .. } | Self::TempFileError { .. } => {
                Some("Make sure the library directory is writable.")
            }
            Self::DigestNotFound { .. } => {
                Some("Add the archive's sha256 digest to the configuration or install offline.")
            }
            Self::BundleAcquisitionFailed { .. } | Self::RuntimeResolutionFailed { .. } => {
                Some("Retry the installation or follow the offline installation instructions.")
            }
            Self::NoDirectoryAfterExtraction { .. } | Self::ExtractionFailed { .. } => {
                Some("The downloaded archive has an unexpected layout.")
            }
            Self::UnsupportedArchive { .. } => {
                Some("Only .zip and .tar.gz archives can be installed.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::BundleAcquisitionFailed { .. }
                | Self::RuntimeResolutionFailed { .. }
                | Self::ExtractionFailed { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::LibraryDirUnavailable { .. } => "install.library_dir_unavailable",
            Self::TempFileError { .. } => "install.temp_file_error",
            Self::ExtractionFailed { .. } => "install.extraction_failed",
            Self::NoDirectoryAfterExtraction { .. } => "install.no_directory_after_extraction",
            Self::UnsupportedArchive { .. } => "install.unsupported_archive",
            Self::DigestNotFound { .. } => "install.digest_not_found",
            Self::BundleAcquisitionFailed { .. } => "install.bundle_acquisition_failed",
            Self::RuntimeResolutionFailed { .. } => "install.runtime_resolution_failed",
            Self::FilesystemError { .. } => "install.filesystem_error",
            Self::ValidationFailed { .. } => "install.validation_failed",
        };
        Some(code)
    }
}
