//! Shared HTTP access for retrievers.
//!
//! One [`HttpClient`] is built per [`DocumentHandler`](crate::DocumentHandler) and handed to
//! every retriever call, so connection pools are reused and every request carries the same
//! explicit timeout. Responses are classified into two failure classes: the request never
//! completed ([`EvidenceError::Transport`]) or the server answered with a non-success status
//! ([`EvidenceError::RemoteFetch`]).

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::*;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// User agent sent with every request.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Thin wrapper over [`reqwest::Client`] with a fixed timeout.
#[derive(Debug, Clone)]
pub struct HttpClient {
  /// Underlying connection pool
  inner:   reqwest::Client,
  /// Timeout applied to every request
  timeout: Duration,
}

impl Default for HttpClient {
  fn default() -> Self { Self::new(DEFAULT_TIMEOUT) }
}

impl HttpClient {
  /// Builds a client whose requests time out after `timeout`.
  pub fn new(timeout: Duration) -> Self {
    let inner = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(USER_AGENT)
      .build()
      .unwrap_or_else(|e| {
        warn!("Failed to build configured HTTP client ({e}), using defaults");
        reqwest::Client::new()
      });
    Self { inner, timeout }
  }

  /// The timeout applied to requests.
  pub fn timeout(&self) -> Duration { self.timeout }

  /// Issues a GET and returns the body of a 200 response.
  ///
  /// # Errors
  ///
  /// - [`EvidenceError::Transport`] when no response arrives
  /// - [`EvidenceError::RemoteFetch`] when the status is anything but 200
  pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
    self.get_bytes_with_headers(url, &[]).await
  }

  /// Like [`HttpClient::get_bytes`], sending additional request headers.
  pub async fn get_bytes_with_headers(
    &self,
    url: &str,
    headers: &[(&str, String)],
  ) -> Result<Vec<u8>> {
    let mut header_map = HeaderMap::new();
    for (key, value) in headers {
      let name = HeaderName::from_bytes(key.as_bytes())
        .map_err(|e| EvidenceError::Config(format!("Invalid header name {key}: {e}")))?;
      let value = HeaderValue::from_str(value)
        .map_err(|e| EvidenceError::Config(format!("Invalid value for header {key}: {e}")))?;
      header_map.insert(name, value);
    }

    debug!("GET {url}");
    let response = self
      .inner
      .get(url)
      .headers(header_map)
      .send()
      .await
      .map_err(|source| EvidenceError::Transport { url: url.to_string(), source })?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
      trace!("{url} response: {response:?}");
      return Err(EvidenceError::RemoteFetch { url: url.to_string(), status: status.as_u16() });
    }

    let bytes = response
      .bytes()
      .await
      .map_err(|source| EvidenceError::Transport { url: url.to_string(), source })?;
    Ok(bytes.to_vec())
  }
}
