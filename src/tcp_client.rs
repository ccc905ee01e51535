use crate::endpoint::Endpoint;
use crate::message::{Message, TopicFilter};
use crate::messages::*;
use crate::transport::Transport;
use async_std::{net::TcpStream, prelude::*};
use async_trait::async_trait;
use log::{debug, error, trace, warn};
use std::io;
use std::net::Shutdown;

/// Longest frame accepted from a publisher, newline excluded.
pub const MAX_FRAME_LEN: usize = 1 << 20;

struct Connection {
  stream: TcpStream,
  /// Bytes read but not yet split into frames. Kept across cancelled
  /// receives so nothing read from the socket is lost.
  pending: Vec<u8>,
}

impl Connection {
  /// Next newline-terminated frame, or `None` at end of stream.
  async fn next_frame(&mut self, max_len: usize) -> io::Result<Option<String>> {
    let mut scanned = 0;
    loop {
      if let Some(pos) = self.pending[scanned..].iter().position(|b| *b == b'\n') {
        let end = scanned + pos;
        if end > max_len {
          return Err(frame_too_long(max_len));
        }
        let mut frame: Vec<u8> = self.pending.drain(..=end).collect();
        frame.pop();
        return String::from_utf8(frame)
          .map(Some)
          .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err));
      }
      if self.pending.len() > max_len {
        return Err(frame_too_long(max_len));
      }
      scanned = self.pending.len();

      let mut buf = [0; 4096];
      let n = (&self.stream).read(&mut buf).await?;
      if n == 0 {
        return Ok(None);
      }
      self.pending.extend_from_slice(&buf[..n]);
    }
  }
}

fn frame_too_long(max_len: usize) -> io::Error {
  io::Error::new(
    io::ErrorKind::InvalidData,
    format!("frame exceeds {} bytes", max_len),
  )
}

/// Subscriber side of the line-delimited JSON protocol over TCP.
pub struct TcpTransport {
  conn: Option<Connection>,
  filter: TopicFilter,
  max_frame_len: usize,
}

impl Default for TcpTransport {
  fn default() -> TcpTransport {
    TcpTransport {
      conn: None,
      filter: TopicFilter::all(),
      max_frame_len: MAX_FRAME_LEN,
    }
  }
}

impl TcpTransport {
  pub fn new() -> TcpTransport {
    TcpTransport::default()
  }

  /// An oversized frame fails the receive, which the client treats as a
  /// disconnect.
  pub fn with_max_frame_len(mut self, max_frame_len: usize) -> TcpTransport {
    self.max_frame_len = max_frame_len;
    self
  }

  fn connection(&mut self) -> io::Result<&mut Connection> {
    self
      .conn
      .as_mut()
      .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "not connected"))
  }
}

#[async_trait]
impl Transport for TcpTransport {
  async fn connect(&mut self, endpoint: &Endpoint) -> io::Result<()> {
    self.close().await;

    let stream = TcpStream::connect(endpoint.socket_addr()).await?;
    stream.set_nodelay(true)?;
    debug!("Connected to {}", stream.peer_addr()?);

    self.conn = Some(Connection {
      stream,
      pending: Vec::new(),
    });
    Ok(())
  }

  async fn set_filter(&mut self, filter: &TopicFilter) -> io::Result<()> {
    let frame = if filter.is_all() {
      serde_json::to_string(&MsgSubscribeAll::new())?
    } else {
      serde_json::to_string(&MsgSubscribe::new(filter.as_bytes()))?
    };

    let conn = self.connection()?;
    let mut writer = &conn.stream;
    writer.write_all(frame.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    self.filter = filter.clone();
    debug!("Subscribe to {}", filter);
    Ok(())
  }

  async fn receive(&mut self) -> io::Result<Message> {
    let filter = self.filter.clone();
    let max_frame_len = self.max_frame_len;
    let conn = self.connection()?;

    loop {
      let line = match conn.next_frame(max_frame_len).await? {
        Some(line) => line,
        None => {
          return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "publisher closed the connection",
          ))
        }
      };

      let header: MsgHeader = match serde_json::from_str(&line) {
        Ok(header) => header,
        Err(err) => {
          error!("parse json failed, err = {:?}", err);
          continue;
        }
      };

      match header.msgtype.as_str() {
        MSG_TYPE_PUBLISH => {
          let publish: MsgPublish = match serde_json::from_str(&line) {
            Ok(publish) => publish,
            Err(err) => {
              error!("parse publish failed, err = {:?}", err);
              continue;
            }
          };
          let msg = Message::from(publish.data);
          if filter.matches(&msg) {
            return Ok(msg);
          }
          trace!("dropping {:?}, outside {}", msg, filter);
        }
        MSG_TYPE_SUBSCRIBE_SUCCESS => debug!("Subscription acknowledged"),
        MSG_TYPE_SUBSCRIBE_FAILED => {
          let reason = serde_json::from_str::<MsgSubscribeFailed>(&line)
            .map(|failed| failed.message)
            .unwrap_or_default();
          return Err(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            format!("subscription rejected: {}", reason),
          ));
        }
        other => warn!("ignoring unexpected frame type {:?}", other),
      }
    }
  }

  async fn close(&mut self) {
    if let Some(conn) = self.conn.take() {
      if let Err(err) = conn.stream.shutdown(Shutdown::Both) {
        debug!("shutdown failed, err = {}", err);
      }
    }
  }
}
