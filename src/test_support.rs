//! Scripted in-memory transport for unit tests.

use crate::endpoint::Endpoint;
use crate::message::{Message, TopicFilter};
use crate::transport::Transport;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
  Connect,
  SetFilter(Vec<u8>),
  Close,
}

enum Frame {
  Message(Message),
  Disconnect,
}

struct Script {
  inbox: VecDeque<Frame>,
  failing_connects: usize,
  reachable: bool,
  hanging: bool,
  rejecting: bool,
  connected: bool,
  events: Vec<SimEvent>,
}

/// Publisher stand-in. The inbox survives reconnects, like a publisher that
/// keeps going while the subscriber is away. No filtering is done here, so
/// the client's own filtering is what gets exercised. An empty inbox blocks
/// `receive` forever.
#[derive(Clone)]
pub struct SimTransport {
  script: Arc<Mutex<Script>>,
}

impl SimTransport {
  pub fn new() -> SimTransport {
    SimTransport {
      script: Arc::new(Mutex::new(Script {
        inbox: VecDeque::new(),
        failing_connects: 0,
        reachable: true,
        hanging: false,
        rejecting: false,
        connected: false,
        events: Vec::new(),
      })),
    }
  }

  pub fn push(&self, data: &str) {
    self.lock().inbox.push_back(Frame::Message(Message::from(data)));
  }

  pub fn disconnect(&self) {
    self.lock().inbox.push_back(Frame::Disconnect);
  }

  pub fn fail_connects(&self, n: usize) {
    self.lock().failing_connects = n;
  }

  pub fn set_reachable(&self, reachable: bool) {
    self.lock().reachable = reachable;
  }

  /// Connect attempts never complete.
  pub fn set_hanging(&self, hanging: bool) {
    self.lock().hanging = hanging;
  }

  /// Connects succeed but the subscription is refused on the first receive,
  /// like a publisher answering `subscribe_failed`.
  pub fn set_rejecting(&self, rejecting: bool) {
    self.lock().rejecting = rejecting;
  }

  pub fn is_connected(&self) -> bool {
    self.lock().connected
  }

  pub fn events(&self) -> Vec<SimEvent> {
    self.lock().events.clone()
  }

  pub fn filters(&self) -> Vec<Vec<u8>> {
    self
      .events()
      .into_iter()
      .filter_map(|event| match event {
        SimEvent::SetFilter(prefix) => Some(prefix),
        _ => None,
      })
      .collect()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
    self.script.lock().unwrap()
  }
}

#[async_trait]
impl Transport for SimTransport {
  async fn connect(&mut self, _endpoint: &Endpoint) -> io::Result<()> {
    let hanging = {
      let mut script = self.lock();
      script.events.push(SimEvent::Connect);
      script.hanging
    };
    if hanging {
      return futures::future::pending().await;
    }

    let mut script = self.lock();
    if !script.reachable {
      return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "unreachable"));
    }
    if script.failing_connects > 0 {
      script.failing_connects -= 1;
      return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
    }
    script.connected = true;
    Ok(())
  }

  async fn set_filter(&mut self, filter: &TopicFilter) -> io::Result<()> {
    let mut script = self.lock();
    script.events.push(SimEvent::SetFilter(filter.as_bytes().to_vec()));
    Ok(())
  }

  async fn receive(&mut self) -> io::Result<Message> {
    let frame = {
      let mut script = self.lock();
      if !script.connected {
        return Err(io::Error::new(io::ErrorKind::NotConnected, "not connected"));
      }
      if script.rejecting {
        script.connected = false;
        return Err(io::Error::new(
          io::ErrorKind::ConnectionRefused,
          "subscription rejected",
        ));
      }
      let frame = script.inbox.pop_front();
      if let Some(Frame::Disconnect) = frame {
        script.connected = false;
      }
      frame
    };
    match frame {
      Some(Frame::Message(msg)) => Ok(msg),
      Some(Frame::Disconnect) => Err(io::Error::new(
        io::ErrorKind::ConnectionReset,
        "simulated disconnect",
      )),
      None => futures::future::pending().await,
    }
  }

  async fn close(&mut self) {
    let mut script = self.lock();
    script.events.push(SimEvent::Close);
    script.connected = false;
  }
}
