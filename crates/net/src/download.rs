//! Streaming file download with byte-level progress

use crate::client::{map_transport_error, NetClient};
use futures::StreamExt;
use lts_errors::{Error, NetworkError};
use lts_events::{AppEvent, DownloadEvent, EventEmitter, EventSender, FailureContext};
use lts_progress::ProgressStack;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Minimum time between two progress label updates
const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Removes the destination file on drop unless the download completed
struct PartialFileGuard {
    path: PathBuf,
    committed: bool,
}

impl PartialFileGuard {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PartialFileGuard {
    fn drop(&mut self) {
        if !self.committed {
            // Best-effort cleanup - ignore errors
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Download `url` to `dest`, following redirects.
///
/// Progress goes to the innermost frame of `progress`: its label is rewritten
/// to `"<label>  <downloaded>MB/<total>MB"` at most every 500 ms, and only when
/// the server announces a `Content-Length`. On failure nothing is left at
/// `dest`. Returns the number of bytes written.
///
/// # Errors
///
/// Returns the `NetworkError` conditions of [`NetClient::get_following`],
/// transport errors while streaming, and I/O errors writing `dest`.
pub async fn download(
    client: &NetClient,
    url: &str,
    dest: &Path,
    progress: &mut ProgressStack,
    tx: &EventSender,
) -> Result<u64, Error> {
    let result = download_inner(client, url, dest, progress, tx).await;
    if let Err(err) = &result {
        tracing::warn!(url, dest = %dest.display(), error = %err, "download failed");
        tx.emit(AppEvent::Download(DownloadEvent::Failed {
            url: url.to_string(),
            failure: FailureContext::from_error(err),
        }));
    }
    result
}

#[allow(clippy::cast_precision_loss)]
async fn download_inner(
    client: &NetClient,
    url: &str,
    dest: &Path,
    progress: &mut ProgressStack,
    tx: &EventSender,
) -> Result<u64, Error> {
    let original_label = progress.task_name().to_string();

    let (response, final_url) = client
        .get_following(url, |from, to, status| {
            tx.emit(AppEvent::Download(DownloadEvent::Redirected {
                from: from.to_string(),
                to: to.to_string(),
                status,
            }));
        })
        .await?;

    let total_bytes = response.content_length().filter(|&n| n > 0);
    tx.emit_download_started(&final_url, total_bytes);

    let total_mb = total_bytes.map(megabytes);
    match total_mb {
        Some(total_mb) => {
            progress.update_task(0.0, Some(&format!("{original_label}  0MB/{total_mb}MB")));
        }
        None => progress.update_task(0.0, Some(&original_label)),
    }

    let guard = PartialFileGuard::new(dest);
    let mut file = File::create(dest)
        .await
        .map_err(|e| Error::io_with_path(&e, dest))?;

    let mut stream = response.bytes_stream();
    let mut downloaded = 0u64;
    let mut last_update = Instant::now();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| map_transport_error(&final_url, &e))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;
        downloaded += chunk.len() as u64;

        if let (Some(total), Some(total_mb)) = (total_bytes, total_mb) {
            if last_update.elapsed() >= PROGRESS_INTERVAL {
                last_update = Instant::now();
                let label = format!("{original_label}  {}MB/{total_mb}MB", megabytes(downloaded));
                progress.update_task(downloaded as f64 / total as f64, Some(&label));
            }
        }
    }

    file.flush()
        .await
        .map_err(|e| Error::io_with_path(&e, dest))?;
    drop(file);

    if let Some(total) = total_bytes {
        if downloaded < total {
            return Err(NetworkError::DownloadFailed(format!(
                "{final_url}: connection closed after {downloaded} of {total} bytes"
            ))
            .into());
        }
    }

    guard.commit();
    tracing::info!(url = %final_url, dest = %dest.display(), bytes = downloaded, "download complete");
    tx.emit_download_completed(&final_url, dest.to_path_buf(), downloaded);
    Ok(downloaded)
}

/// Bytes to whole megabytes (10^6), rounded
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn megabytes(bytes: u64) -> u64 {
    (bytes as f64 / 1e6).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_megabytes_rounds() {
        assert_eq!(megabytes(0), 0);
        assert_eq!(megabytes(499_999), 0);
        assert_eq!(megabytes(500_000), 1);
        assert_eq!(megabytes(15_400_000), 15);
    }

    #[test]
    fn test_guard_removes_uncommitted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.zip");
        std::fs::write(&path, b"partial").unwrap();
        drop(PartialFileGuard::new(&path));
        assert!(!path.exists());

        std::fs::write(&path, b"complete").unwrap();
        PartialFileGuard::new(&path).commit();
        assert!(path.exists());
    }
}
