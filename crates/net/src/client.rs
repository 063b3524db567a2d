//! HTTP client with fixed identification headers and manual redirects

use futures::StreamExt;
use lts_errors::{Error, NetworkError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, LOCATION};
use reqwest::{redirect, Client, Response, StatusCode};
use std::time::Duration;
use url::Url;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// Sent as `Authorization: token <value>` when present
    pub auth_token: Option<String>,
    pub max_redirects: usize,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300), // 5 minutes for large downloads
            connect_timeout: Duration::from_secs(30),
            user_agent: lts_config::constants::USER_AGENT.to_string(),
            auth_token: None,
            max_redirects: 10,
        }
    }
}

impl NetConfig {
    /// Build from the `[network]` config section, reading the token from the
    /// configured environment variable.
    #[must_use]
    pub fn from_config(config: &lts_config::NetworkConfig) -> Self {
        let auth_token = std::env::var(&config.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty());
        Self {
            timeout: Duration::from_secs(config.timeout),
            connect_timeout: Duration::from_secs(config.connect_timeout),
            user_agent: config.user_agent.clone(),
            auth_token,
            ..Self::default()
        }
    }
}

/// HTTP client wrapper
///
/// Redirects are never followed by reqwest itself. [`NetClient::get_following`]
/// walks them so a missing `Location` header surfaces as a protocol violation
/// instead of a generic transport error.
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the
    /// underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.auth_token {
            let value = HeaderValue::from_str(&format!("token {token}"))
                .map_err(|e| NetworkError::InvalidUrl(format!("invalid auth token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Execute a single GET request without following redirects
    ///
    /// # Errors
    ///
    /// Returns an error on timeouts, connection failures or other transport errors.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| map_transport_error(url, &e))
    }

    /// GET a URL, following 301/302/307 redirects, and require a 200 answer.
    ///
    /// Returns the response and the URL that finally answered. `on_redirect`
    /// is called with `(from, to, status)` for every hop.
    ///
    /// # Errors
    ///
    /// Returns `RedirectWithoutLocation` for a redirect lacking a `Location`
    /// header, `HttpError` for any other non-200 status (after draining the
    /// body), `TooManyRedirects` when the hop limit is exceeded, and transport
    /// errors as they occur.
    pub async fn get_following<F>(
        &self,
        url: &str,
        mut on_redirect: F,
    ) -> Result<(Response, String), Error>
    where
        F: FnMut(&str, &str, u16),
    {
        let mut current = url.to_string();

        for _ in 0..=self.config.max_redirects {
            let response = self.get(&current).await?;
            let status = response.status();

            if is_followed_redirect(status) {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| NetworkError::RedirectWithoutLocation {
                        url: current.clone(),
                        status: status.as_u16(),
                    })?;
                let next = resolve_location(&current, location)?;
                tracing::debug!(from = %current, to = %next, status = status.as_u16(), "redirected");
                on_redirect(&current, &next, status.as_u16());
                current = next;
                continue;
            }

            if status != StatusCode::OK {
                drain(response).await;
                tracing::warn!(url = %current, status = status.as_u16(), "request failed");
                return Err(NetworkError::HttpError {
                    url: current,
                    status: status.as_u16(),
                }
                .into());
            }

            return Ok((response, current));
        }

        Err(NetworkError::TooManyRedirects {
            url: url.to_string(),
        }
        .into())
    }
}

fn is_followed_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::TEMPORARY_REDIRECT
    )
}

/// Resolve a `Location` header against the URL that sent it
fn resolve_location(base: &str, location: &str) -> Result<String, Error> {
    let base = Url::parse(base).map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;
    base.join(location)
        .map(String::from)
        .map_err(|e| NetworkError::InvalidUrl(format!("{location}: {e}")).into())
}

/// Read and discard the body so the connection can be reused
async fn drain(response: Response) {
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        if chunk.is_err() {
            break;
        }
    }
}

pub(crate) fn map_transport_error(url: &str, error: &reqwest::Error) -> Error {
    if error.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
        }
        .into()
    } else if error.is_connect() {
        NetworkError::ConnectionRefused(format!("{url}: {error}")).into()
    } else {
        NetworkError::DownloadFailed(format!("{url}: {error}")).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_location() {
        assert_eq!(
            resolve_location("https://example.com/a/b.zip", "/c/d.zip").unwrap(),
            "https://example.com/c/d.zip"
        );
        assert_eq!(
            resolve_location("https://example.com/a/b.zip", "https://cdn.example.com/x").unwrap(),
            "https://cdn.example.com/x"
        );
    }

    #[test]
    fn test_only_three_redirect_codes_are_followed() {
        assert!(is_followed_redirect(StatusCode::MOVED_PERMANENTLY));
        assert!(is_followed_redirect(StatusCode::FOUND));
        assert!(is_followed_redirect(StatusCode::TEMPORARY_REDIRECT));
        assert!(!is_followed_redirect(StatusCode::SEE_OTHER));
        assert!(!is_followed_redirect(StatusCode::OK));
    }
}
