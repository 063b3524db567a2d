//! Discovery of installed versions by directory-name convention

use crate::policy::SelectionPolicy;
use lts_errors::Error;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// An installed directory matched by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    pub version: String,
    pub path: PathBuf,
}

/// List the versions embedded in directory names `<prefix><version><suffix>`.
///
/// Only immediate subdirectories of `dir` are considered. A missing `dir`
/// yields an empty list.
///
/// # Errors
///
/// Returns an I/O error if `dir` exists but cannot be read.
pub async fn scan_versions(dir: &Path, prefix: &str, suffix: &str) -> Result<Vec<String>, Error> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io_with_path(&e, dir)),
    };

    let mut versions = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io_with_path(&e, dir))?
    {
        let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir());
        if !is_dir {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(version) = name
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(suffix))
            .filter(|version| !version.is_empty())
        {
            versions.push(version.to_string());
        }
    }

    versions.sort();
    tracing::debug!(dir = %dir.display(), prefix, count = versions.len(), "scanned installed versions");
    Ok(versions)
}

/// Find the installed directory whose version the policy selects.
///
/// # Errors
///
/// Returns the errors of [`scan_versions`].
pub async fn find_installed(
    dir: &Path,
    prefix: &str,
    suffix: &str,
    policy: &SelectionPolicy,
) -> Result<Option<InstalledVersion>, Error> {
    let versions = scan_versions(dir, prefix, suffix).await?;
    Ok(policy.select(&versions).map(|version| InstalledVersion {
        path: dir.join(format!("{prefix}{version}{suffix}")),
        version,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_dir_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let versions = scan_versions(&temp.path().join("absent"), "ltex-ls-", "")
            .await
            .unwrap();
        assert!(versions.is_empty());
    }

    #[tokio::test]
    async fn test_files_and_bare_prefix_are_ignored() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp.path().join("ltex-ls-")).unwrap();
        std::fs::write(temp.path().join("ltex-ls-1.0.0"), b"not a dir").unwrap();
        std::fs::create_dir(temp.path().join("ltex-ls-2.0.0")).unwrap();

        let versions = scan_versions(temp.path(), "ltex-ls-", "").await.unwrap();
        assert_eq!(versions, vec!["2.0.0"]);
    }
}
