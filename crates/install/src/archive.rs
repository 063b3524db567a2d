//! Archive extraction and relocation into the library directory

use crate::staging::StagingDir;
use flate2::read::GzDecoder;
use lts_errors::{Error, InstallError};
use lts_events::{AppEvent, EventEmitter, EventSender, InstallEvent};
use lts_progress::ProgressStack;
use lts_types::ArchiveKind;
use std::fs::File;
use std::path::{Path, PathBuf};
use tar::Archive as TarArchive;
use tokio::task;

/// Extract `archive` and move its single top-level directory into `lib_dir`.
///
/// Extraction happens in a fresh staging directory inside `lib_dir`. Stray
/// top-level files are deleted; if several top-level directories appear, the
/// first in name order is kept and the others are only reported. When a
/// directory of the same name already exists in `lib_dir` it is kept as is.
/// Returns the path of the installed directory.
///
/// Progress goes to the innermost frame of `progress`.
///
/// # Errors
///
/// Returns `TempFileError` if the staging directory cannot be created,
/// `ExtractionFailed` for unreadable archives, `NoDirectoryAfterExtraction`
/// if the archive has no top-level directory, and `FilesystemError` if the
/// payload cannot be moved into place.
pub async fn install_archive(
    archive: &Path,
    kind: ArchiveKind,
    lib_dir: &Path,
    progress: &mut ProgressStack,
    tx: &EventSender,
) -> Result<PathBuf, Error> {
    let staging = StagingDir::new_in(lib_dir, ".lts-extract-")?;
    tracing::info!(archive = %archive.display(), to = %staging.path().display(), "extracting");

    extract(archive, kind, staging.path()).await?;
    progress.update_task(0.8, None);

    let payload = find_payload_dir(staging.path(), archive).await?;
    progress.update_task(0.85, None);

    let Some(dir_name) = payload.file_name() else {
        return Err(InstallError::NoDirectoryAfterExtraction {
            archive: archive.display().to_string(),
        }
        .into());
    };
    let target = lib_dir.join(dir_name);
    let target_exists = tokio::fs::try_exists(&target)
        .await
        .map_err(|e| Error::io_with_path(&e, &target))?;
    progress.update_task(0.9, None);

    if target_exists {
        tracing::warn!(
            from = %payload.display(),
            to = %target.display(),
            "target already exists, keeping the existing directory"
        );
    } else {
        tracing::info!(from = %payload.display(), to = %target.display(), "moving");
        tokio::fs::rename(&payload, &target)
            .await
            .map_err(|e| InstallError::FilesystemError {
                operation: "rename".into(),
                path: target.display().to_string(),
                message: e.to_string(),
            })?;
    }
    progress.update_task(0.95, None);

    staging.close();

    tx.emit(AppEvent::Install(InstallEvent::Extracted {
        archive: archive.to_path_buf(),
        target: target.clone(),
    }));
    Ok(target)
}

/// Pick the payload directory among the staging directory's entries
async fn find_payload_dir(staging: &Path, archive: &Path) -> Result<PathBuf, Error> {
    let mut entries = tokio::fs::read_dir(staging)
        .await
        .map_err(|e| Error::io_with_path(&e, staging))?;

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io_with_path(&e, staging))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| Error::io_with_path(&e, entry.path()))?;
        if file_type.is_dir() {
            dirs.push(entry.path());
        } else {
            files.push(entry.path());
        }
    }

    for file in files {
        tracing::debug!(path = %file.display(), "deleting stray file");
        if let Err(e) = tokio::fs::remove_file(&file).await {
            tracing::warn!(path = %file.display(), error = %e, "could not delete file, leaving it on disk");
        }
    }

    dirs.sort();
    let mut dirs = dirs.into_iter();
    let payload = dirs.next().ok_or_else(|| InstallError::NoDirectoryAfterExtraction {
        archive: archive.display().to_string(),
    })?;
    for extra in dirs {
        tracing::warn!(
            kept = %payload.display(),
            ignored = %extra.display(),
            "found multiple directories after extraction"
        );
    }

    tracing::debug!(path = %payload.display(), "found extracted directory");
    Ok(payload)
}

async fn extract(archive: &Path, kind: ArchiveKind, dest: &Path) -> Result<(), Error> {
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();

    task::spawn_blocking(move || match kind {
        ArchiveKind::TarGz => extract_tar_gz(&archive, &dest),
        ArchiveKind::Zip => extract_zip(&archive, &dest),
    })
    .await
    .map_err(|e| InstallError::ExtractionFailed {
        message: format!("task join error: {e}"),
    })?
}

fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<(), Error> {
    let file = File::open(archive).map_err(|e| Error::io_with_path(&e, archive))?;
    let mut tar = TarArchive::new(GzDecoder::new(file));
    tar.unpack(dest).map_err(|e| {
        InstallError::ExtractionFailed {
            message: format!("{}: {e}", archive.display()),
        }
        .into()
    })
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<(), Error> {
    let failed = |e: &dyn std::fmt::Display| -> Error {
        InstallError::ExtractionFailed {
            message: format!("{}: {e}", archive.display()),
        }
        .into()
    };

    let file = File::open(archive).map_err(|e| Error::io_with_path(&e, archive))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| failed(&e))?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| failed(&e))?;
        // Entries escaping the destination are skipped
        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!(name = entry.name(), "skipping zip entry outside the archive root");
            continue;
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|e| Error::io_with_path(&e, &out_path))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(&e, parent))?;
        }
        let mut out = File::create(&out_path).map_err(|e| Error::io_with_path(&e, &out_path))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| failed(&e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode)).ok();
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_corrupt_archive_fails_and_cleans_up() {
        let lib = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let archive = scratch.path().join("broken.tar.gz");
        std::fs::write(&archive, b"definitely not gzip").unwrap();

        let (tx, _rx) = lts_events::channel();
        let mut progress = ProgressStack::detached("Extracting");
        let err = install_archive(&archive, ArchiveKind::TarGz, lib.path(), &mut progress, &tx)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Install(InstallError::ExtractionFailed { .. })));
        assert_eq!(std::fs::read_dir(lib.path()).unwrap().count(), 0);
    }
}
