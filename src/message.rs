use std::fmt;

/// One frame as delivered by the transport. The topic is whatever prefix the
/// publisher put in front of the payload; nothing else is assumed.
#[derive(Clone, PartialEq, Eq)]
pub struct Message {
  data: Vec<u8>,
}

impl Message {
  pub fn new(data: impl Into<Vec<u8>>) -> Message {
    Message { data: data.into() }
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.data
  }

  pub fn into_bytes(self) -> Vec<u8> {
    self.data
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }
}

impl fmt::Debug for Message {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Message({:?})", String::from_utf8_lossy(&self.data))
  }
}

impl From<Vec<u8>> for Message {
  fn from(data: Vec<u8>) -> Message {
    Message { data }
  }
}

impl From<&str> for Message {
  fn from(s: &str) -> Message {
    Message::new(s.as_bytes())
  }
}

/// Byte prefix selecting which messages are delivered. Empty matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicFilter {
  prefix: Vec<u8>,
}

impl TopicFilter {
  pub fn new(prefix: impl Into<Vec<u8>>) -> TopicFilter {
    TopicFilter {
      prefix: prefix.into(),
    }
  }

  pub fn all() -> TopicFilter {
    TopicFilter::default()
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.prefix
  }

  pub fn is_all(&self) -> bool {
    self.prefix.is_empty()
  }

  pub fn matches(&self, msg: &Message) -> bool {
    msg.as_bytes().starts_with(&self.prefix)
  }
}

impl From<&str> for TopicFilter {
  fn from(s: &str) -> TopicFilter {
    TopicFilter::new(s.as_bytes())
  }
}

impl fmt::Display for TopicFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_all() {
      f.write_str("all")
    } else {
      write!(f, "{:?}", String::from_utf8_lossy(&self.prefix))
    }
  }
}
