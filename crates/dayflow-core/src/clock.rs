//! Time source seam. The engine never reads the system clock directly.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Local, NaiveDate, Utc};

pub trait Clock: Send + Sync {
  /// The current instant.
  fn now(&self) -> DateTime<Utc>;

  /// The current calendar date as seen by the workplace.
  fn today(&self) -> NaiveDate;
}

/// Wall-clock time; calendar dates follow the host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }

  fn today(&self) -> NaiveDate { Local::now().date_naive() }
}

/// A manually driven clock. Calendar dates are taken in UTC.
#[derive(Debug)]
pub struct FixedClock {
  now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
  pub fn new(now: DateTime<Utc>) -> Self { Self { now: Mutex::new(now) } }

  pub fn set(&self, now: DateTime<Utc>) {
    *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
  }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> {
    *self.now.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn today(&self) -> NaiveDate { self.now().date_naive() }
}
