use crate::client::{State, StopHandle, SubscriberClient};
use crate::error::Result;
use crate::message::Message;
use crate::transport::Transport;
use async_std::task;

/// Thread-model front end: every call blocks the calling thread until the
/// underlying client makes progress. Stop it from another thread through
/// `stop_handle`.
pub struct BlockingSubscriber<T> {
  client: SubscriberClient<T>,
  done: bool,
}

impl<T: Transport> BlockingSubscriber<T> {
  pub fn new(client: SubscriberClient<T>) -> BlockingSubscriber<T> {
    BlockingSubscriber {
      client,
      done: false,
    }
  }

  pub fn start(&mut self) -> Result<()> {
    task::block_on(self.client.start())
  }

  pub fn start_with_retry(&mut self) -> Result<()> {
    task::block_on(self.client.start_with_retry())
  }

  /// Blocks until a message arrives; `Ok(None)` once stopped.
  pub fn recv(&mut self) -> Result<Option<Message>> {
    task::block_on(self.client.next_message())
  }

  pub fn stop(&mut self) {
    task::block_on(self.client.stop())
  }

  pub fn stop_handle(&self) -> StopHandle {
    self.client.stop_handle()
  }

  pub fn state(&self) -> State {
    self.client.state()
  }

  pub fn into_inner(self) -> SubscriberClient<T> {
    self.client
  }
}

impl<T: Transport> Iterator for BlockingSubscriber<T> {
  type Item = Result<Message>;

  fn next(&mut self) -> Option<Result<Message>> {
    if self.done {
      return None;
    }
    match self.recv() {
      Ok(Some(msg)) => Some(Ok(msg)),
      Ok(None) => {
        self.done = true;
        None
      }
      Err(err) => {
        self.done = true;
        Some(Err(err))
      }
    }
  }
}
