//! Clock implementations.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Mutex, PoisonError};

use super::traits::Clock;

/// Wall-clock time. The production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// A clock that only moves when told to.
///
/// Lets tests place reads exactly on either side of the expiry boundary
/// without sleeping.
#[derive(Debug)]
#[allow(dead_code)]
pub struct ManualClock {
  now: Mutex<DateTime<Utc>>,
}

#[allow(dead_code)]
impl ManualClock {
  /// Create a clock frozen at the given instant.
  pub fn starting_at(start: DateTime<Utc>) -> Self {
    Self {
      now: Mutex::new(start),
    }
  }

  /// Move the clock forward.
  pub fn advance(&self, by: Duration) {
    let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
    *now = *now + by;
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    *self.now.lock().unwrap_or_else(PoisonError::into_inner)
  }
}
