//! Outbound application events.
//!
//! The [`FridgeService`](super::service::FridgeService) and
//! [`Poller`](super::poller::Poller) emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log them, push them to a
//! time-series store, feed a dashboard cache.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::channels::{Channel, ChannelValue};
use crate::history::{StateSnapshot, StatusSnapshot};
use crate::sensors::GAUGE_COUNT;

use super::commands::FridgeCommand;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic per-fridge snapshot.
    Telemetry(FridgeReading),

    /// A command changed one channel.
    ChannelChanged {
        fridge_id: String,
        channel: Channel,
        from: ChannelValue,
        to: ChannelValue,
    },

    /// A command was accepted (whether or not it changed anything).
    CommandExecuted {
        fridge_id: String,
        command: FridgeCommand,
    },

    /// A history transition matched a known operational procedure.
    Alert {
        fridge_id: String,
        label: String,
        at: NaiveDateTime,
    },
}

/// Point-in-time reading of one fridge, as handed to sinks and cached by
/// the poller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FridgeReading {
    pub fridge_id: String,
    /// When the poll ran (not when the state last changed).
    pub polled_at: NaiveDateTime,
    pub state: StateSnapshot,
    pub status: Option<StatusSnapshot>,
    pub pressures_mbar: Option<[f64; GAUGE_COUNT]>,
    /// Rendered status summary.
    pub message: String,
}
