//! Scoped temporary directories inside the library directory
//!
//! Every download and extraction attempt works in its own directory next to
//! its final destination, so the last rename stays on one filesystem.

use lts_errors::{Error, InstallError};
use std::path::Path;
use tempfile::TempDir;

/// Temporary directory removed on every exit path
///
/// Dropping removes it silently; [`StagingDir::close`] removes it and logs a
/// failure instead of hiding it. Either way nothing escalates.
#[derive(Debug)]
pub struct StagingDir {
    dir: TempDir,
}

impl StagingDir {
    /// Create a fresh directory inside `parent`.
    ///
    /// # Errors
    ///
    /// Returns `InstallError::TempFileError`, which aborts the installation.
    pub fn new_in(parent: &Path, prefix: &str) -> Result<Self, Error> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(parent)
            .map_err(|e| InstallError::TempFileError {
                message: format!("{}: {e}", parent.display()),
            })?;
        tracing::debug!(path = %dir.path().display(), "created staging directory");
        Ok(Self { dir })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory, logging instead of failing
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            tracing::warn!(path = %path.display(), error = %e, "could not delete staging directory, leaving it on disk");
        }
    }
}
