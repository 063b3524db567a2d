//! JSON endpoints: release manifests

use crate::client::NetClient;
use lts_errors::{Error, NetworkError};
use lts_events::{EventEmitter, EventSender};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

/// Fetch a JSON document, following redirects.
///
/// # Errors
///
/// Returns `UnexpectedContentType` unless the server declares
/// `application/json`, `InvalidBody` if the body does not parse, and the
/// request errors of [`NetClient::get_following`].
pub async fn fetch_json(client: &NetClient, url: &str, tx: &EventSender) -> Result<Value, Error> {
    tx.emit_debug(format!("Fetching JSON from {url}"));

    let (response, final_url) = client.get_following(url, |_, _, _| {}).await?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let is_json = content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"));
    if !is_json {
        return Err(NetworkError::UnexpectedContentType {
            url: final_url,
            content_type,
        }
        .into());
    }

    let body = response
        .text()
        .await
        .map_err(|e| NetworkError::DownloadFailed(format!("{final_url}: {e}")))?;

    serde_json::from_str(&body).map_err(|e| {
        NetworkError::InvalidBody {
            url: final_url,
            message: e.to_string(),
        }
        .into()
    })
}

/// Extract version tags from a release manifest.
///
/// Accepts an array of plain strings or of objects carrying `tag_name`.
/// Entries of any other shape are skipped.
#[must_use]
pub fn release_tags(manifest: &Value) -> Vec<String> {
    manifest
        .as_array()
        .map(|releases| {
            releases
                .iter()
                .filter_map(|release| match release {
                    Value::String(tag) => Some(tag.clone()),
                    Value::Object(fields) => fields
                        .get("tag_name")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Fetch a release manifest and return its version tags
///
/// # Errors
///
/// Returns the errors of [`fetch_json`].
pub async fn fetch_release_tags(
    client: &NetClient,
    url: &str,
    tx: &EventSender,
) -> Result<Vec<String>, Error> {
    let manifest = fetch_json(client, url, tx).await?;
    let tags = release_tags(&manifest);
    tracing::debug!(url, count = tags.len(), "release manifest fetched");
    Ok(tags)
}
