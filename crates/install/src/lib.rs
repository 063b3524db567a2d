#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Dependency installation for lts
//!
//! This crate locates, downloads, verifies, unpacks and finally probes the
//! language-server bundle and the runtime it needs. Every step falls back to
//! the next resolution tier instead of failing outright.

mod archive;
mod fetch;
mod manager;
mod probe;
mod staging;
mod tiers;

pub use archive::install_archive;
pub use fetch::install_dependency;
pub use manager::{
    BundleTier, DependencyInstaller, InstallOutcome, InstallSession, InstallState,
    ReadyInstallation, RecoveryChoice, RecoveryPrompt, RuntimeTier, ShowOfflineInstructions,
    BUNDLE_TIERS, RUNTIME_TIERS,
};
pub use probe::{
    ambient_env, build_descriptor, heap_options, parse_version_output, runtime_major,
    DescriptorSettings, ExecutableProbe, ReportedVersions,
};
pub use staging::StagingDir;
pub use tiers::{Resolved, StrategyChain, TierOutcome};

// Re-export EventSender for callers wiring up the installer
pub use lts_events::EventSender;
