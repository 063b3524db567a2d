use lts_types::{DependencyKind, OriginTier};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Events emitted while the installer walks its resolution tiers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstallEvent {
    /// The orchestrator entered a new state
    StateChanged { state: String },

    TierStarted {
        dependency: DependencyKind,
        tier: String,
        attempt: usize,
    },

    /// A tier found nothing to try
    TierSkipped {
        dependency: DependencyKind,
        tier: String,
        reason: String,
    },

    /// A tier failed and the next one will be tried
    TierFailed {
        dependency: DependencyKind,
        tier: String,
        failure: FailureContext,
    },

    Located {
        dependency: DependencyKind,
        path: PathBuf,
        origin: OriginTier,
    },

    Verified { path: PathBuf, digest: String },

    Extracted { archive: PathBuf, target: PathBuf },

    Ready {
        bundle: PathBuf,
        runtime: Option<PathBuf>,
    },

    Failed {
        failure: FailureContext,
        offline_instructions: String,
    },
}
