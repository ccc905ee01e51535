use std::path::Path;

use serde::Deserialize;

use crate::backoff::BackoffConfig;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::message::TopicFilter;

pub const DEFAULT_ENDPOINT: &str = "tcp://127.0.0.1:5556";

/// Everything one subscription needs.
///
/// ```json
/// {
///   "endpoint": "tcp://127.0.0.1:5556",
///   "filter": "block",
///   "backoff": { "base_ms": 200, "cap_ms": 5000, "jitter": true },
///   "max_retries": 10
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriberConfig {
  pub endpoint: Endpoint,

  #[serde(default, deserialize_with = "filter_from_str")]
  pub filter: TopicFilter,

  #[serde(default)]
  pub backoff: BackoffConfig,

  /// Reconnect attempts per disconnect before giving up. `None` retries forever.
  #[serde(default)]
  pub max_retries: Option<u32>,
}

impl SubscriberConfig {
  pub fn new(endpoint: Endpoint, filter: TopicFilter) -> SubscriberConfig {
    SubscriberConfig {
      endpoint,
      filter,
      backoff: BackoffConfig::default(),
      max_retries: None,
    }
  }

  pub fn from_json(json: &str) -> Result<SubscriberConfig> {
    serde_json::from_str(json).map_err(|err| Error::Configuration(err.to_string()))
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<SubscriberConfig> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
      .map_err(|err| Error::Configuration(format!("read {}: {}", path.display(), err)))?;
    SubscriberConfig::from_json(&json)
  }

  pub fn with_backoff(mut self, backoff: BackoffConfig) -> SubscriberConfig {
    self.backoff = backoff;
    self
  }

  pub fn with_max_retries(mut self, max_retries: u32) -> SubscriberConfig {
    self.max_retries = Some(max_retries);
    self
  }

  pub(crate) fn validate(&self) -> Result<()> {
    if self.backoff.base_ms > self.backoff.cap_ms {
      return Err(Error::Configuration(format!(
        "backoff base {}ms exceeds cap {}ms",
        self.backoff.base_ms, self.backoff.cap_ms
      )));
    }
    if self.max_retries == Some(0) {
      return Err(Error::Configuration(
        "max_retries must be at least 1, omit it to retry forever".to_string(),
      ));
    }
    Ok(())
  }
}

fn filter_from_str<'de, D>(deserializer: D) -> std::result::Result<TopicFilter, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let s = String::deserialize(deserializer)?;
  Ok(TopicFilter::from(s.as_str()))
}
