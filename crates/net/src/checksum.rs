//! Checksum files published next to release assets

use crate::client::NetClient;
use lts_errors::{Error, NetworkError};
use lts_events::{EventEmitter, EventSender};

/// Suffix of the checksum file that accompanies each runtime asset
pub const CHECKSUM_SUFFIX: &str = ".sha256.txt";

/// Fetch the sha256 digest published for the asset at `asset_url`.
///
/// The checksum file lives at `<asset_url>.sha256.txt` and holds one
/// `<hex digest> <file name>` line, as written by `sha256sum`.
///
/// # Errors
///
/// Returns `InvalidBody` if the file does not hold a digest for `file_name`,
/// and the request errors of [`NetClient::get_following`].
pub async fn fetch_published_digest(
    client: &NetClient,
    asset_url: &str,
    file_name: &str,
    tx: &EventSender,
) -> Result<String, Error> {
    let url = format!("{asset_url}{CHECKSUM_SUFFIX}");
    tx.emit_debug(format!("Fetching published digest from {url}"));

    let (response, final_url) = client.get_following(&url, |_, _, _| {}).await?;
    let body = response
        .text()
        .await
        .map_err(|e| NetworkError::DownloadFailed(format!("{final_url}: {e}")))?;

    let digest = parse_checksum_listing(&body, file_name).ok_or_else(|| {
        NetworkError::InvalidBody {
            url: final_url.clone(),
            message: format!("no sha256 digest for {file_name}"),
        }
    })?;
    tracing::info!(url = %final_url, file_name, digest = %digest, "using published digest");
    Ok(digest)
}

/// Find the digest of `file_name` in `sha256sum` output.
///
/// A line without a file name counts for any file. Binary-mode markers
/// (`*name`) are accepted.
#[must_use]
pub fn parse_checksum_listing(listing: &str, file_name: &str) -> Option<String> {
    listing.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        let digest = fields.next()?;
        if digest.len() != 64 || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match fields.next() {
            Some(name) if name.trim_start_matches('*') != file_name => None,
            _ => Some(digest.to_ascii_lowercase()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "0a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f9";

    #[test]
    fn test_listing_must_name_the_file() {
        let name = "OpenJDK11U-jre_x64_linux_hotspot_11.0.8_10.tar.gz";
        assert_eq!(
            parse_checksum_listing(&format!("{DIGEST}  {name}\n"), name).as_deref(),
            Some(DIGEST)
        );
        assert_eq!(
            parse_checksum_listing(&format!("{}  *{name}", DIGEST.to_uppercase()), name)
                .as_deref(),
            Some(DIGEST)
        );
        assert_eq!(
            parse_checksum_listing(DIGEST, name).as_deref(),
            Some(DIGEST)
        );
        assert_eq!(
            parse_checksum_listing(&format!("{DIGEST}  other.zip"), name),
            None
        );
        assert_eq!(parse_checksum_listing("deadbeef  x", "x"), None);
        assert_eq!(parse_checksum_listing("", name), None);
    }
}
