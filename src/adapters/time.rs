//! Clock adapters.
//!
//! - [`SystemClock`]: local wall-clock time, for live simulation.
//! - [`ManualClock`]: a steppable clock shared between handles, for
//!   scripted scenarios and tests.  Clones observe the same time.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Local, NaiveDateTime};

use crate::app::ports::Clock;

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock that only moves when told to (or by a fixed step per reading).
///
/// Time is kept as whole seconds since the Unix epoch in an atomic, so
/// clones can be handed to a store while the test keeps one to advance.
#[derive(Debug, Clone)]
pub struct ManualClock {
    secs: Arc<AtomicI64>,
    /// Seconds added after every `now()` call.
    step_secs: i64,
}

impl ManualClock {
    /// Clock frozen at `start`.
    pub fn new(start: NaiveDateTime) -> Self {
        Self::with_step(start, 0)
    }

    /// Clock that advances by `step_secs` after every reading.
    pub fn with_step(start: NaiveDateTime, step_secs: i64) -> Self {
        Self {
            secs: Arc::new(AtomicI64::new(start.and_utc().timestamp())),
            step_secs,
        }
    }

    pub fn advance(&self, secs: i64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, at: NaiveDateTime) {
        self.secs.store(at.and_utc().timestamp(), Ordering::SeqCst);
    }

    /// Current time without stepping.
    pub fn current(&self) -> NaiveDateTime {
        to_naive(self.secs.load(Ordering::SeqCst))
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> NaiveDateTime {
        to_naive(self.secs.fetch_add(self.step_secs, Ordering::SeqCst))
    }
}

fn to_naive(secs: i64) -> NaiveDateTime {
    DateTime::from_timestamp(secs, 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .naive_utc()
}
