//! Append-only snapshot history.
//!
//! Three parallel sequences advance together: one state, one status and
//! one pressure snapshot per committed mutation, all sharing a timestamp:
//!
//! ```text
//!  index │ states[i]          statuses[i]        pressures[i]
//!  ──────┼──────────────────────────────────────────────────────
//!    0   │ seed @ t0          seed @ t0          seed @ t0
//!    1   │ pulsetube=1 @ t1   MC 250 K @ t1      1e-3 ×6 @ t1
//!    …   │ …                  …                  …
//! ```
//!
//! Entries are never mutated or removed once pushed.

pub mod rows;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::channels::{ChangeSet, Channel, ChannelStates, ChannelValue};
use crate::error::{Error, MirrorError, Result};
use crate::sensors::{Pressures, SensorReadings};

pub use rows::{HistoryRecord, Stream};

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Every channel's value at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub at: NaiveDateTime,
    pub channels: ChannelStates,
}

impl StateSnapshot {
    pub fn get(&self, channel: Channel) -> ChannelValue {
        self.channels.get(channel)
    }

    /// Exact changed pairs relative to `previous`.
    pub fn diff(&self, previous: &StateSnapshot) -> ChangeSet {
        self.channels.diff(&previous.channels)
    }
}

/// Every sensor reading at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub at: NaiveDateTime,
    pub readings: SensorReadings,
}

/// All six gauge readings at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureSnapshot {
    pub at: NaiveDateTime,
    pub pressures: Pressures,
}

/// The most recent transition that changed at least one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    /// Changed channels and their new values.
    pub changes: ChangeSet,
    /// Timestamp of the later snapshot of the pair.
    pub at: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    states: Vec<StateSnapshot>,
    statuses: Vec<StatusSnapshot>,
    pressures: Vec<PressureSnapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a history from three reparsed streams.  The streams must
    /// have equal length and pairwise equal timestamps.
    pub fn from_parts(
        states: Vec<StateSnapshot>,
        statuses: Vec<StatusSnapshot>,
        pressures: Vec<PressureSnapshot>,
    ) -> core::result::Result<Self, MirrorError> {
        if states.len() != statuses.len() || states.len() != pressures.len() {
            return Err(MirrorError::MalformedRow("streams differ in length"));
        }
        let aligned = states
            .iter()
            .zip(&statuses)
            .zip(&pressures)
            .all(|((s, st), p)| s.at == st.at && s.at == p.at);
        if !aligned {
            return Err(MirrorError::MalformedRow("stream timestamps differ"));
        }
        Ok(Self {
            states,
            statuses,
            pressures,
        })
    }

    /// Rebuild a history from mirrored rows, one iterator per stream.
    /// Blank lines are skipped.
    pub fn from_rows<'a>(
        states: impl IntoIterator<Item = &'a str>,
        statuses: impl IntoIterator<Item = &'a str>,
        pressures: impl IntoIterator<Item = &'a str>,
    ) -> core::result::Result<Self, MirrorError> {
        fn parse_all<'a, T>(
            lines: impl IntoIterator<Item = &'a str>,
            parse: fn(&[&str]) -> core::result::Result<T, MirrorError>,
        ) -> core::result::Result<Vec<T>, MirrorError> {
            lines
                .into_iter()
                .filter(|l| !l.trim().is_empty())
                .map(|l| parse(&rows::split_line(l)))
                .collect()
        }

        Self::from_parts(
            parse_all(states, rows::parse_state)?,
            parse_all(statuses, rows::parse_status)?,
            parse_all(pressures, rows::parse_pressure)?,
        )
    }

    /// Append one synchronized triple.
    pub(crate) fn push(
        &mut self,
        state: StateSnapshot,
        status: StatusSnapshot,
        pressure: PressureSnapshot,
    ) {
        debug_assert!(state.at == status.at && state.at == pressure.at);
        self.states.push(state);
        self.statuses.push(status);
        self.pressures.push(pressure);
    }

    /// Number of snapshot triples.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[StateSnapshot] {
        &self.states
    }

    pub fn statuses(&self) -> &[StatusSnapshot] {
        &self.statuses
    }

    pub fn pressures(&self) -> &[PressureSnapshot] {
        &self.pressures
    }

    /// State `depth` entries back from the newest (0 = newest).  Depths
    /// beyond the start of history clamp to the oldest entry.
    pub fn state_at_depth(&self, depth: usize) -> Result<&StateSnapshot> {
        let len = self.states.len();
        if len == 0 {
            return Err(Error::NoHistory);
        }
        let idx = len - 1 - depth.min(len - 1);
        Ok(&self.states[idx])
    }

    pub fn latest_status(&self) -> Option<&StatusSnapshot> {
        self.statuses.last()
    }

    pub fn latest_pressures(&self) -> Option<&PressureSnapshot> {
        self.pressures.last()
    }

    /// Walk back from the newest pair of states until one differs.
    pub fn last_state_change(&self) -> Option<StateChange> {
        self.states.windows(2).rev().find_map(|pair| {
            let changes = pair[1].diff(&pair[0]);
            (!changes.is_empty()).then_some(StateChange {
                changes,
                at: pair[1].at,
            })
        })
    }
}
