use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
  Tcp,
}

impl Scheme {
  pub fn as_str(&self) -> &'static str {
    match self {
      Scheme::Tcp => "tcp",
    }
  }
}

/// Publisher address, `tcp://host:port`. A bare `host:port` is read as tcp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
  scheme: Scheme,
  host: String,
  port: u16,
}

impl Endpoint {
  pub fn new(scheme: Scheme, host: impl Into<String>, port: u16) -> Result<Endpoint> {
    let host = host.into();
    if host.is_empty() {
      return Err(Error::Configuration("endpoint host is empty".to_string()));
    }
    if let Some(bad) = host.chars().find(|c| !is_host_char(*c)) {
      return Err(Error::Configuration(format!(
        "endpoint host {:?} contains {:?}",
        host, bad
      )));
    }
    if port == 0 {
      return Err(Error::Configuration("endpoint port must be in 1..=65535".to_string()));
    }
    Ok(Endpoint { scheme, host, port })
  }

  pub fn scheme(&self) -> Scheme {
    self.scheme
  }

  pub fn host(&self) -> &str {
    &self.host
  }

  pub fn port(&self) -> u16 {
    self.port
  }

  /// `host:port` suitable for a socket connect, with IPv6 hosts bracketed.
  pub fn socket_addr(&self) -> String {
    if self.host.contains(':') {
      format!("[{}]:{}", self.host, self.port)
    } else {
      format!("{}:{}", self.host, self.port)
    }
  }
}

impl fmt::Display for Endpoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}://{}", self.scheme.as_str(), self.socket_addr())
  }
}

impl FromStr for Endpoint {
  type Err = Error;

  fn from_str(s: &str) -> Result<Endpoint> {
    let s = s.trim();
    let (scheme, rest) = match s.split_once("://") {
      Some(("tcp", rest)) => (Scheme::Tcp, rest),
      Some((other, _)) => {
        return Err(Error::Configuration(format!(
          "unsupported endpoint scheme {:?} in {:?}",
          other, s
        )))
      }
      None => (Scheme::Tcp, s),
    };

    let (host, port) = if let Some(bracketed) = rest.strip_prefix('[') {
      let (host, tail) = bracketed.split_once(']').ok_or_else(|| {
        Error::Configuration(format!("unbalanced '[' in endpoint {:?}", s))
      })?;
      let port = tail.strip_prefix(':').ok_or_else(|| {
        Error::Configuration(format!("expected ':port' after ']' in endpoint {:?}", s))
      })?;
      (host, port)
    } else {
      let (host, port) = rest.rsplit_once(':').ok_or_else(|| {
        Error::Configuration(format!("endpoint {:?} is missing a port", s))
      })?;
      if host.contains(':') {
        return Err(Error::Configuration(format!(
          "IPv6 host in {:?} must be bracketed",
          s
        )));
      }
      (host, port)
    };
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
      return Err(Error::Configuration(format!("bad port {:?} in {:?}", port, s)));
    }
    let port = port
      .parse::<u16>()
      .map_err(|err| Error::Configuration(format!("bad port in {:?}: {}", s, err)))?;

    Endpoint::new(scheme, host, port)
  }
}

/// Hostnames, IPv4 and bare IPv6 literals. No brackets, separators or spaces.
fn is_host_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '%')
}

impl<'de> Deserialize<'de> for Endpoint {
  fn deserialize<D>(deserializer: D) -> std::result::Result<Endpoint, D::Error>
  where
    D: Deserializer<'de>,
  {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}
