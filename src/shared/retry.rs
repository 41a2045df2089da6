use std::future::Future;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

/// Exponential backoff for idempotent backend writes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
  pub max_attempts: u32,
  pub initial_delay_ms: u64,
  pub max_delay_ms: u64,
  pub multiplier: u32,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 3,
      initial_delay_ms: 100,
      max_delay_ms: 2_000,
      multiplier: 2,
    }
  }
}

impl RetryPolicy {
  pub fn none() -> Self {
    Self {
      max_attempts: 1,
      ..Self::default()
    }
  }

  /// Delay before the given retry (1-based: the wait after the first failure
  /// is `delay_for(1)`).
  pub fn delay_for(&self, retry: u32) -> Duration {
    let factor = u64::from(self.multiplier.max(1))
      .saturating_pow(retry.saturating_sub(1));
    let delay = self.initial_delay_ms.saturating_mul(factor);
    Duration::from_millis(delay.min(self.max_delay_ms))
  }

  /// Runs `operation` until it succeeds, fails with an error `is_transient`
  /// rejects, or attempts run out.
  pub async fn run<T, E, F, Fut>(
    &self,
    label: &str,
    is_transient: impl Fn(&E) -> bool,
    mut operation: F,
  ) -> Result<T, E>
  where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
  {
    let mut attempt = 1;
    loop {
      match operation().await {
        Ok(value) => return Ok(value),
        Err(error) if attempt < self.max_attempts && is_transient(&error) => {
          let delay = self.delay_for(attempt);
          warn!(
            "{} failed (attempt {}/{}): {}, retrying in {:?}",
            label, attempt, self.max_attempts, error, delay
          );
          actix_rt::time::sleep(delay).await;
          attempt += 1;
        }
        Err(error) => return Err(error),
      }
    }
  }
}
