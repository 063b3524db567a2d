use serde::{Deserialize, Serialize};

use crate::EventSource;
use lts_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod download;
pub mod general;
pub mod install;
pub mod probe;
pub mod progress;

pub use download::*;
pub use general::*;
pub use install::*;
pub use probe::*;
pub use progress::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Archive downloads
    Download(DownloadEvent),

    /// Tier resolution, verification and extraction
    Install(InstallEvent),

    /// Increment-based progress for the host UI
    Progress(ProgressEvent),

    /// Executable validation runs
    Probe(ProbeEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Download(_) => EventSource::DOWNLOAD,
            Self::Install(_) => EventSource::INSTALL,
            Self::Progress(_) => EventSource::PROGRESS,
            Self::Probe(_) => EventSource::PROBE,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. } | GeneralEvent::OperationFailed { .. })
            | Self::Install(InstallEvent::Failed { .. }) => Level::ERROR,

            // Recoverable failures are warnings; the next tier may still succeed
            Self::General(GeneralEvent::Warning { .. })
            | Self::Download(DownloadEvent::Failed { .. })
            | Self::Install(InstallEvent::TierFailed { .. })
            | Self::Probe(ProbeEvent::Failed { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Download(DownloadEvent::Redirected { .. })
            | Self::Install(InstallEvent::TierSkipped { .. })
            | Self::Probe(ProbeEvent::Started { .. }) => Level::DEBUG,

            Self::Progress(_) => Level::TRACE,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "lts::events::general",
            Self::Download(_) => "lts::events::download",
            Self::Install(_) => "lts::events::install",
            Self::Progress(_) => "lts::events::progress",
            Self::Probe(_) => "lts::events::probe",
        }
    }
}
