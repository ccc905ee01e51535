//! Topic-filtered pub/sub subscriber that survives publisher restarts.
//!
//! A [`SubscriberClient`] owns one subscription, an endpoint plus a topic
//! prefix, and hands out received messages either as an async stream
//! ([`SubscriberClient::messages`]) or through the blocking
//! [`BlockingSubscriber`]. Dropped connections are re-established with
//! exponential backoff and the filter is re-applied before anything else is
//! delivered. Delivery is at-most-once: messages published while the client
//! is disconnected are lost.

#![recursion_limit = "512"]

pub mod backoff;
pub use backoff::*;

pub mod blocking;
pub use blocking::*;

pub mod client;
pub use client::*;

pub mod config;
pub use config::*;

pub mod endpoint;
pub use endpoint::*;

pub mod error;
pub use error::*;

pub mod message;
pub use message::*;

pub mod messages;

pub mod tcp_client;
pub use tcp_client::*;

pub mod transport;
pub use transport::*;

#[cfg(test)]
mod test_support;
