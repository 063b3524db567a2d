//! Download, verify and extract one dependency

use crate::archive::install_archive;
use crate::staging::StagingDir;
use lts_errors::{Error, InstallError};
use lts_events::{AppEvent, EventEmitter, EventSender, InstallEvent};
use lts_net::NetClient;
use lts_progress::ProgressStack;
use lts_types::DependencySpec;
use std::path::{Path, PathBuf};

/// Fetch `spec` into `lib_dir` and return the installed directory.
///
/// The archive is downloaded into a staging directory, verified against
/// `spec.expected_digest` and only then extracted. Progress is split 10 %
/// preparation, 70 % download, 10 % verification and 10 % extraction, all
/// nested under the caller's current frame.
///
/// # Errors
///
/// Returns `UnsupportedArchive` before any request when the file name is
/// neither a zip nor a gzipped tarball, `TempFileError` when the archive
/// cannot be written into the staging directory, and otherwise the first
/// failing step's error. The staging directory is removed on every path.
pub async fn install_dependency(
    client: &NetClient,
    spec: &DependencySpec,
    lib_dir: &Path,
    progress: &mut ProgressStack,
    tx: &EventSender,
) -> Result<PathBuf, Error> {
    let label = format!("{} {}", spec.name, spec.version);
    let kind = spec
        .archive_kind()
        .ok_or_else(|| InstallError::UnsupportedArchive {
            path: spec.file_name().to_string(),
        })?;

    progress.start_task(0.1, format!("Downloading {label}"))?;
    let staging = StagingDir::new_in(lib_dir, ".lts-download-")?;
    let archive_path = staging.path().join(spec.file_name());
    progress.finish_task()?;

    progress.start_task(0.7, format!("Downloading {label}"))?;
    tracing::info!(url = %spec.url, to = %archive_path.display(), "downloading {label}");
    lts_net::download(client, &spec.url, &archive_path, progress, tx)
        .await
        .map_err(|e| staging_write_error(e, staging.path()))?;
    progress.finish_task()?;

    progress.start_task(0.1, format!("Verifying {label}"))?;
    let digest = lts_hash::verify_file(&archive_path, &spec.expected_digest).await?;
    tx.emit(AppEvent::Install(InstallEvent::Verified {
        path: archive_path.clone(),
        digest: digest.to_hex(),
    }));
    progress.finish_task()?;

    progress.start_task(0.1, format!("Extracting {label}"))?;
    let installed = install_archive(&archive_path, kind, lib_dir, progress, tx).await?;
    progress.finish_task()?;

    staging.close();
    Ok(installed)
}

/// I/O failures on paths inside the staging directory abort the installation
fn staging_write_error(error: Error, staging: &Path) -> Error {
    match error {
        Error::Io {
            message,
            path: Some(path),
            ..
        } if path.starts_with(staging) => InstallError::TempFileError {
            message: format!("{}: {message}", path.display()),
        }
        .into(),
        other => other,
    }
}
