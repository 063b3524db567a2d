//! Dependency descriptions and resolved installation locations

use crate::ArchiveKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The two dependencies the installer manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    Bundle,
    Runtime,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bundle => write!(f, "bundle"),
            Self::Runtime => write!(f, "runtime"),
        }
    }
}

/// Everything needed to fetch and verify one archive.
///
/// One instance is built per download attempt and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    /// Human-readable name used in progress labels
    pub name: String,
    /// Version string as published by the vendor
    pub version: String,
    /// Release asset URL
    pub url: String,
    /// Expected sha256 digest, hex encoded
    pub expected_digest: String,
}

impl DependencySpec {
    /// Archive file name, taken from the last URL path segment
    #[must_use]
    pub fn file_name(&self) -> &str {
        let path = self.url.split(['?', '#']).next().unwrap_or(&self.url);
        path.rsplit('/').next().unwrap_or(path)
    }

    /// Container format, detected from the archive file name's extension
    #[must_use]
    pub fn archive_kind(&self) -> Option<ArchiveKind> {
        ArchiveKind::from_path(Path::new(self.file_name()))
    }
}

/// Which resolution tier produced a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OriginTier {
    ExplicitConfig,
    Bundled,
    FreshlyDownloaded,
}

impl fmt::Display for OriginTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExplicitConfig => write!(f, "explicit-config"),
            Self::Bundled => write!(f, "bundled"),
            Self::FreshlyDownloaded => write!(f, "freshly-downloaded"),
        }
    }
}

/// A resolved installation directory and the tier that found it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledLocation {
    pub path: PathBuf,
    pub origin: OriginTier,
}

impl InstalledLocation {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, origin: OriginTier) -> Self {
        Self {
            path: path.into(),
            origin,
        }
    }
}

/// Runtime selected for a probe attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuntimeChoice {
    /// Whatever runtime the system provides on its search path
    System,
    /// A runtime home directory
    Installed(InstalledLocation),
}

impl RuntimeChoice {
    /// Runtime home directory, if any
    #[must_use]
    pub fn home(&self) -> Option<&Path> {
        match self {
            Self::System => None,
            Self::Installed(location) => Some(&location.path),
        }
    }

    /// Origin tier, if the runtime was located by a tier
    #[must_use]
    pub fn origin(&self) -> Option<OriginTier> {
        match self {
            Self::System => None,
            Self::Installed(location) => Some(location.origin),
        }
    }
}
