use std::io;

use crate::endpoint::Endpoint;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// Malformed endpoint, filter or configuration document.
  #[error("invalid configuration: {0}")]
  Configuration(String),

  /// The initial connect (or filter application) failed. Retryable.
  #[error("connect to {endpoint} failed: {source}")]
  Connection {
    endpoint: Endpoint,
    #[source]
    source: io::Error,
  },

  /// The reconnect budget ran out; the client is stopped.
  #[error("giving up on {endpoint} after {attempts} attempts: {source}")]
  FatalConnection {
    endpoint: Endpoint,
    attempts: u32,
    #[source]
    source: io::Error,
  },

  #[error("subscriber has not been started")]
  NotStarted,

  #[error("subscriber is stopped")]
  Stopped,
}

impl Error {
  pub fn is_fatal(&self) -> bool {
    matches!(self, Error::FatalConnection { .. } | Error::Stopped)
  }
}
