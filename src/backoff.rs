//! Reconnect pacing: exponential backoff with a cap and optional jitter.

use std::time::Duration;

use rand::Rng;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
  /// First delay, in milliseconds.
  pub base_ms: u64,
  /// Upper bound on any single delay, in milliseconds.
  pub cap_ms: u64,
  /// Draw each delay uniformly from `[d/2, d]` instead of using `d`.
  pub jitter: bool,
}

impl Default for BackoffConfig {
  fn default() -> BackoffConfig {
    BackoffConfig {
      base_ms: 200,
      cap_ms: 5_000,
      jitter: true,
    }
  }
}

impl BackoffConfig {
  pub fn start(&self, max_retries: Option<u32>) -> Backoff {
    Backoff {
      config: self.clone(),
      max_retries,
      attempts: 0,
    }
  }
}

/// Delay schedule and retry budget, shared by consecutive failed connections.
#[derive(Debug)]
pub struct Backoff {
  config: BackoffConfig,
  max_retries: Option<u32>,
  attempts: u32,
}

impl Backoff {
  /// Delay before the next attempt, or `None` once the retry budget is spent.
  pub fn next_delay(&mut self) -> Option<Duration> {
    if self.is_exhausted() {
      return None;
    }
    let delay = self.ceiling(self.attempts);
    self.attempts += 1;

    if self.config.jitter && delay > 1 {
      let half = delay / 2;
      Some(Duration::from_millis(rand::rng().random_range(half..=delay)))
    } else {
      Some(Duration::from_millis(delay))
    }
  }

  pub fn attempts(&self) -> u32 {
    self.attempts
  }

  pub fn is_exhausted(&self) -> bool {
    match self.max_retries {
      Some(max) => self.attempts >= max,
      None => false,
    }
  }

  /// Back to the base delay with the full budget.
  pub fn reset(&mut self) {
    self.attempts = 0;
  }

  fn ceiling(&self, attempt: u32) -> u64 {
    let factor = 1u64.checked_shl(attempt.min(63)).unwrap_or(u64::MAX);
    self
      .config
      .base_ms
      .saturating_mul(factor)
      .min(self.config.cap_ms)
  }
}
