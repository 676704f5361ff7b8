//! Mock port adapters for integration tests.
//!
//! Record every emitted event or attempted mirror write so tests can
//! assert on the full history without a log backend or a filesystem.

use std::io;

use chrono::{NaiveDate, NaiveDateTime};
use fridgesim::adapters::time::ManualClock;
use fridgesim::app::events::AppEvent;
use fridgesim::app::ports::{EventSink, HistoryWriter};
use fridgesim::channels::{Channel, ChannelValue};
use fridgesim::error::MirrorError;
use fridgesim::history::HistoryRecord;

// ── Event recorder ────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(fridge_id, label)` of every alert, in emission order.
    pub fn alerts(&self) -> Vec<(String, String)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Alert {
                    fridge_id, label, ..
                } => Some((fridge_id.clone(), label.clone())),
                _ => None,
            })
            .collect()
    }

    /// `(fridge_id, channel, to)` of every channel change.
    pub fn changes(&self) -> Vec<(String, Channel, ChannelValue)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::ChannelChanged {
                    fridge_id,
                    channel,
                    to,
                    ..
                } => Some((fridge_id.clone(), *channel, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn telemetry_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Telemetry(_)))
            .count()
    }

    pub fn executed_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::CommandExecuted { .. }))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Failing mirror ────────────────────────────────────────────

/// Mirror whose backing storage is full.  Counts attempts.
#[derive(Debug, Default)]
pub struct FailingWriter {
    pub attempts: usize,
}

impl HistoryWriter for FailingWriter {
    fn append(&mut self, _record: &HistoryRecord<'_>) -> Result<(), MirrorError> {
        self.attempts += 1;
        Err(MirrorError::Io(io::ErrorKind::StorageFull))
    }
}

// ── Time helpers ──────────────────────────────────────────────

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 14)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

/// Clock that advances one second per snapshot.
pub fn stepping_clock() -> ManualClock {
    ManualClock::with_step(start_time(), 1)
}
