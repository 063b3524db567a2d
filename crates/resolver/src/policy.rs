//! Version selection policy

use lts_errors::{Error, VersionError};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How to pick one version out of a set of candidates
///
/// The same policy is applied to release manifests and to directory scans so
/// both sources agree on what "the version to use" means.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", content = "ceiling", rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Highest valid version, no upper bound
    #[default]
    Latest,
    /// Highest valid version that is `<=` the ceiling
    CompatibleUpTo(Version),
}

impl SelectionPolicy {
    /// Build a policy from an optional ceiling string.
    ///
    /// # Errors
    ///
    /// Returns `VersionError::InvalidVersion` if the ceiling is not a
    /// semantic version.
    pub fn from_ceiling(ceiling: Option<&str>) -> Result<Self, Error> {
        match ceiling.map(str::trim).filter(|c| !c.is_empty()) {
            None => Ok(Self::Latest),
            Some(raw) => Version::parse(raw)
                .map(Self::CompatibleUpTo)
                .map_err(|_| {
                    VersionError::InvalidVersion {
                        input: raw.to_string(),
                    }
                    .into()
                }),
        }
    }

    #[must_use]
    pub fn admits(&self, version: &Version) -> bool {
        match self {
            Self::Latest => true,
            Self::CompatibleUpTo(ceiling) => version <= ceiling,
        }
    }

    /// Pick the greatest admitted candidate.
    ///
    /// Candidates that are not valid semantic versions are ignored. Returns
    /// the candidate string exactly as given, or `None` if nothing qualifies.
    #[must_use]
    pub fn select<S: AsRef<str>>(&self, candidates: &[S]) -> Option<String> {
        candidates
            .iter()
            .filter_map(|raw| {
                let raw = raw.as_ref();
                Version::parse(raw.trim()).ok().map(|version| (version, raw))
            })
            .filter(|(version, _)| self.admits(version))
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, raw)| raw.to_string())
    }

    /// Like [`SelectionPolicy::select`], but an empty result is an error.
    ///
    /// # Errors
    ///
    /// Returns `VersionError::NoSatisfyingVersion` listing the candidates.
    pub fn select_required<S: AsRef<str>>(&self, candidates: &[S]) -> Result<String, Error> {
        self.select(candidates).ok_or_else(|| {
            VersionError::NoSatisfyingVersion {
                policy: self.to_string(),
                candidates: candidates
                    .iter()
                    .map(AsRef::as_ref)
                    .collect::<Vec<_>>()
                    .join(", "),
            }
            .into()
        })
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::CompatibleUpTo(ceiling) => write!(f, "compatible up to {ceiling}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_prefers_release_over_prerelease() {
        let versions = ["8.0.0", "9.0.0-alpha.1", "9.0.0"];
        assert_eq!(SelectionPolicy::Latest.select(&versions).as_deref(), Some("9.0.0"));
    }

    #[test]
    fn test_latest_ignores_invalid_and_handles_empty() {
        assert_eq!(
            SelectionPolicy::Latest
                .select(&["nightly", "1.2", "2.0.1", "10.0.0-beta"])
                .as_deref(),
            Some("10.0.0-beta")
        );
        assert_eq!(SelectionPolicy::Latest.select::<&str>(&[]), None);
        assert_eq!(SelectionPolicy::Latest.select(&["x", "1.0"]), None);
    }

    #[test]
    fn test_compatible_up_to_is_inclusive() {
        let policy = SelectionPolicy::CompatibleUpTo(Version::new(9, 0, 0));
        assert_eq!(
            policy.select(&["8.0.0", "9.0.0", "10.0.0"]).as_deref(),
            Some("9.0.0")
        );
        assert_eq!(policy.select(&["10.0.0"]), None);
    }

    #[test]
    fn test_from_ceiling() {
        assert_eq!(SelectionPolicy::from_ceiling(None).unwrap(), SelectionPolicy::Latest);
        assert_eq!(SelectionPolicy::from_ceiling(Some("  ")).unwrap(), SelectionPolicy::Latest);
        assert_eq!(
            SelectionPolicy::from_ceiling(Some("15.2.0")).unwrap(),
            SelectionPolicy::CompatibleUpTo(Version::new(15, 2, 0))
        );
        assert!(SelectionPolicy::from_ceiling(Some("fifteen")).is_err());
    }

    #[test]
    fn test_select_required_lists_candidates() {
        let policy = SelectionPolicy::CompatibleUpTo(Version::new(1, 0, 0));
        let err = policy.select_required(&["2.0.0", "3.0.0"]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("compatible up to 1.0.0"));
        assert!(message.contains("2.0.0, 3.0.0"));
    }
}
