#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Version resolution for lts
//!
//! Picks the version to use from a release manifest or from the directories
//! already present in the managed library directory.

mod policy;
mod scan;

pub use policy::SelectionPolicy;
pub use scan::{find_installed, scan_versions, InstalledVersion};

/// Highest version admitted by `policy`, or `None`
///
/// Shorthand for [`SelectionPolicy::select`].
#[must_use]
pub fn latest<S: AsRef<str>>(versions: &[S], policy: &SelectionPolicy) -> Option<String> {
    policy.select(versions)
}
