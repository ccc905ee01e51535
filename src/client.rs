use crate::backoff::Backoff;
use crate::config::SubscriberConfig;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::message::{Message, TopicFilter};
use crate::tcp_client::TcpTransport;
use crate::transport::Transport;
use async_std::{
  channel::{self, Receiver, Sender},
  task,
};
use futures::{future::FutureExt, pin_mut, select_biased, stream, Future, Stream};
use log::{debug, error, info, trace, warn};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
  Created,
  Connected,
  Disconnected,
  /// Terminal.
  Stopped,
}

/// Requests cooperative shutdown of a `SubscriberClient` from any task or
/// thread. Cloning is cheap; every clone controls the same client.
#[derive(Debug, Clone)]
pub struct StopHandle {
  signal: Sender<()>,
}

impl StopHandle {
  /// Returns `true` for the call that actually requested the stop.
  pub fn stop(&self) -> bool {
    self.signal.close()
  }

  pub fn is_stopped(&self) -> bool {
    self.signal.is_closed()
  }
}

/// One subscription (endpoint + topic filter) kept alive across disconnects.
///
/// Delivery is at-most-once: whatever the publisher sends while the client
/// is `Disconnected` is lost and never replayed. Messages already yielded are
/// never yielded again.
pub struct SubscriberClient<T> {
  config: SubscriberConfig,
  transport: T,
  state: State,
  stop_tx: Sender<()>,
  stop_rx: Receiver<()>,
  watcher: Option<Sender<State>>,
  /// Spans disconnect episodes until a connection proves itself by
  /// delivering something, so a publisher that accepts and then drops or
  /// rejects every subscription still exhausts the retry budget.
  backoff: Backoff,
}

impl SubscriberClient<TcpTransport> {
  /// TCP subscriber with the default reconnect policy.
  pub fn tcp(endpoint: &str, filter: impl Into<TopicFilter>) -> Result<Self> {
    let endpoint: Endpoint = endpoint.parse()?;
    SubscriberClient::new(
      SubscriberConfig::new(endpoint, filter.into()),
      TcpTransport::new(),
    )
  }
}

impl<T: Transport> SubscriberClient<T> {
  pub fn new(config: SubscriberConfig, transport: T) -> Result<Self> {
    config.validate()?;
    let (stop_tx, stop_rx) = channel::bounded(1);
    let backoff = config.backoff.start(config.max_retries);
    Ok(SubscriberClient {
      backoff,
      config,
      transport,
      state: State::Created,
      stop_tx,
      stop_rx,
      watcher: None,
    })
  }

  pub fn state(&self) -> State {
    self.state
  }

  pub fn endpoint(&self) -> &Endpoint {
    &self.config.endpoint
  }

  pub fn filter(&self) -> &TopicFilter {
    &self.config.filter
  }

  pub fn stop_handle(&self) -> StopHandle {
    StopHandle {
      signal: self.stop_tx.clone(),
    }
  }

  /// Every later state transition is sent on the returned channel, which
  /// closes once the client is stopped. Replaces any earlier watcher.
  pub fn state_changes(&mut self) -> Receiver<State> {
    let (tx, rx) = channel::unbounded();
    self.watcher = Some(tx);
    rx
  }

  /// Connects and applies the filter. On failure the client stays `Created`
  /// and `start` may be called again.
  pub async fn start(&mut self) -> Result<()> {
    match self.state {
      State::Created => {}
      State::Connected | State::Disconnected => return Ok(()),
      State::Stopped => return Err(Error::Stopped),
    }

    let opened = or_cancelled(
      &self.stop_rx,
      open(&mut self.transport, &self.config.endpoint, &self.config.filter),
    )
    .await;
    match opened {
      Some(Ok(())) => {
        self.set_state(State::Connected);
        Ok(())
      }
      Some(Err(source)) => {
        self.transport.close().await;
        Err(Error::Connection {
          endpoint: self.config.endpoint.clone(),
          source,
        })
      }
      None => {
        self.shutdown().await;
        Err(Error::Stopped)
      }
    }
  }

  /// `start`, then keep retrying under the reconnect policy.
  pub async fn start_with_retry(&mut self) -> Result<()> {
    match self.start().await {
      Err(Error::Connection { source, .. }) => {
        warn!("connect to {} failed: {}", self.config.endpoint, source);
        if self.reconnect(source).await? {
          Ok(())
        } else {
          Err(Error::Stopped)
        }
      }
      other => other,
    }
  }

  /// Waits for the next message matching the filter, reconnecting as needed.
  ///
  /// `Ok(None)` means the sequence is over: the client was stopped, either
  /// now or earlier. A `FatalConnection` error is returned exactly once.
  pub async fn next_message(&mut self) -> Result<Option<Message>> {
    loop {
      if self.state != State::Stopped && self.stop_tx.is_closed() {
        self.shutdown().await;
      }

      match self.state {
        State::Created => return Err(Error::NotStarted),
        State::Stopped => return Ok(None),
        State::Disconnected => {
          let interrupted = io::Error::new(io::ErrorKind::NotConnected, "reconnect interrupted");
          if !self.reconnect(interrupted).await? {
            return Ok(None);
          }
        }
        State::Connected => {
          let received = or_cancelled(&self.stop_rx, self.transport.receive()).await;
          match received {
            Some(Ok(msg)) => {
              self.backoff.reset();
              if self.config.filter.matches(&msg) {
                return Ok(Some(msg));
              }
              trace!("dropping {:?}, outside {}", msg, self.config.filter);
            }
            Some(Err(err)) => {
              warn!(
                "connection to {} lost: {}; messages published until reconnect are dropped",
                self.config.endpoint, err
              );
              self.transport.close().await;
              self.set_state(State::Disconnected);
              if !self.reconnect(err).await? {
                return Ok(None);
              }
            }
            None => {
              self.shutdown().await;
              return Ok(None);
            }
          }
        }
      }
    }
  }

  /// The received messages as a lazy stream. It ends when the client stops
  /// and after the first error; it is not restartable.
  pub fn messages(&mut self) -> impl Stream<Item = Result<Message>> + '_ {
    stream::unfold(Some(self), |client| async move {
      let client = match client {
        Some(client) => client,
        None => return None,
      };
      match client.next_message().await {
        Ok(Some(msg)) => Some((Ok(msg), Some(client))),
        Ok(None) => None,
        Err(err) => Some((Err(err), None)),
      }
    })
  }

  /// Closes the connection and ends the message sequence. Idempotent.
  pub async fn stop(&mut self) {
    self.shutdown().await;
  }

  /// Returns `Ok(true)` once connected again, `Ok(false)` if stopped while
  /// waiting.
  async fn reconnect(&mut self, mut last_error: io::Error) -> Result<bool> {
    loop {
      let delay = match self.backoff.next_delay() {
        Some(delay) => delay,
        None => {
          error!(
            "giving up on {} after {} attempts: {}",
            self.config.endpoint,
            self.backoff.attempts(),
            last_error
          );
          self.shutdown().await;
          return Err(Error::FatalConnection {
            endpoint: self.config.endpoint.clone(),
            attempts: self.backoff.attempts(),
            source: last_error,
          });
        }
      };

      debug!(
        "reconnecting to {} in {:?} (attempt {})",
        self.config.endpoint,
        delay,
        self.backoff.attempts()
      );
      if or_cancelled(&self.stop_rx, task::sleep(delay)).await.is_none() {
        self.shutdown().await;
        return Ok(false);
      }

      let opened = or_cancelled(
        &self.stop_rx,
        open(&mut self.transport, &self.config.endpoint, &self.config.filter),
      )
      .await;
      match opened {
        Some(Ok(())) => {
          info!(
            "reconnected to {} after {} attempts",
            self.config.endpoint,
            self.backoff.attempts()
          );
          self.set_state(State::Connected);
          return Ok(true);
        }
        Some(Err(err)) => {
          warn!("connect to {} failed: {}", self.config.endpoint, err);
          self.transport.close().await;
          last_error = err;
        }
        None => {
          self.shutdown().await;
          return Ok(false);
        }
      }
    }
  }

  async fn shutdown(&mut self) {
    if self.state == State::Stopped {
      return;
    }
    self.stop_tx.close();
    self.transport.close().await;
    self.set_state(State::Stopped);
    self.watcher = None;
    debug!("Subscriber for {} stopped", self.config.endpoint);
  }

  fn set_state(&mut self, state: State) {
    if self.state == state {
      return;
    }
    debug!("{}: {:?} -> {:?}", self.config.endpoint, self.state, state);
    self.state = state;
    if let Some(watcher) = &self.watcher {
      if watcher.try_send(state).is_err() {
        self.watcher = None;
      }
    }
  }
}

/// Connect, then subscribe: no message counts as delivered before the filter
/// is in place on the new connection.
async fn open<T: Transport>(
  transport: &mut T,
  endpoint: &Endpoint,
  filter: &TopicFilter,
) -> io::Result<()> {
  transport.connect(endpoint).await?;
  transport.set_filter(filter).await
}

/// Runs `fut` unless the stop signal fires first. A pending stop always wins.
async fn or_cancelled<F: Future>(stop: &Receiver<()>, fut: F) -> Option<F::Output> {
  let fut = fut.fuse();
  let cancelled = stop.recv().fuse();
  pin_mut!(fut, cancelled);
  select_biased! {
    _ = cancelled => None,
    output = fut => Some(output),
  }
}
