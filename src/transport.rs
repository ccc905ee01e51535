use std::io;

use async_trait::async_trait;

use crate::endpoint::Endpoint;
use crate::message::{Message, TopicFilter};

/// The pub/sub socket a `SubscriberClient` drives.
///
/// Implementations follow ordinary subscriber socket semantics: prefix
/// filtering on the message topic, best-effort (at-most-once) delivery, and
/// ordering preserved per publisher connection only. Any error returned from
/// `receive` is treated as a disconnect.
#[async_trait]
pub trait Transport: Send {
  async fn connect(&mut self, endpoint: &Endpoint) -> io::Result<()>;

  /// Applies the subscription prefix on the current connection. Called after
  /// every successful `connect`.
  async fn set_filter(&mut self, filter: &TopicFilter) -> io::Result<()>;

  /// Waits for the next message. Must not spin when nothing is available.
  async fn receive(&mut self) -> io::Result<Message>;

  /// Releases the connection. Safe to call when not connected.
  async fn close(&mut self);
}
