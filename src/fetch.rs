//! The fetch capability used to mirror remote attachments.

use std::time::Duration;

use thiserror::Error;

/// Bytes returned by a successful fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchedResource {
  /// Response body.
  pub bytes: Vec<u8>,
  /// `Content-Type` reported by the server, if any.
  pub content_type: Option<String>,
}

impl FetchedResource {
  /// Resource without a known content type.
  pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
    Self {
      bytes: bytes.into(),
      content_type: None,
    }
  }
}

/// Reasons an attachment could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
  /// The server answered with a non-success status.
  #[error("{url} returned HTTP {status}")]
  Status {
    /// Requested URL.
    url: String,
    /// Response status code.
    status: u16,
  },
  /// The request never produced a response.
  #[error("request to {url} failed: {source}")]
  Transport {
    /// Requested URL.
    url: String,
    /// Underlying client error.
    #[source]
    source: reqwest::Error,
  },
  /// Network access is switched off for this run.
  #[error("offline mode, skipped {url}")]
  Offline {
    /// Requested URL.
    url: String,
  },
}

/// Capability to retrieve the bytes behind a URL.
pub trait Fetch {
  /// Fetch `url`, blocking until the whole body is available.
  fn fetch(&self, url: &str) -> Result<FetchedResource, FetchError>;
}

impl<F> Fetch for F
where
  F: Fn(&str) -> Result<FetchedResource, FetchError>,
{
  fn fetch(&self, url: &str) -> Result<FetchedResource, FetchError> {
    self(url)
  }
}

/// Blocking HTTP fetcher shared across one generation run.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
  client: reqwest::blocking::Client,
}

impl HttpFetcher {
  /// Build a client with the given per-request timeout and user agent.
  pub fn new(timeout: Duration, user_agent: &str) -> anyhow::Result<Self> {
    let client = reqwest::blocking::Client::builder()
      .timeout(timeout)
      .user_agent(user_agent.to_string())
      .build()?;
    Ok(Self { client })
  }
}

impl Fetch for HttpFetcher {
  fn fetch(&self, url: &str) -> Result<FetchedResource, FetchError> {
    let transport = |source| FetchError::Transport {
      url: url.to_string(),
      source,
    };

    let response = self.client.get(url).send().map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status {
        url: url.to_string(),
        status: status.as_u16(),
      });
    }

    let content_type = response
      .headers()
      .get(reqwest::header::CONTENT_TYPE)
      .and_then(|value| value.to_str().ok())
      .map(|value| value.to_string());
    let bytes = response.bytes().map_err(transport)?;

    Ok(FetchedResource {
      bytes: bytes.to_vec(),
      content_type,
    })
  }
}

/// Fetcher that refuses every request, leaving remote references untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineFetcher;

impl Fetch for OfflineFetcher {
  fn fetch(&self, url: &str) -> Result<FetchedResource, FetchError> {
    Err(FetchError::Offline {
      url: url.to_string(),
    })
  }
}
