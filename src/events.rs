//! Operational event detection over state history.
//!
//! Known procedures (cooldown, warmup, condensing, manual pulse-tube
//! operation) show up as one transition that flips an exact set of
//! channels at once.  [`EventClassifier`] walks the state history newer
//! than its [`Watermark`], diffs each adjacent pair and looks the diff up
//! in [`EVENT_PATTERNS`]:
//!
//! ```text
//!  states:  s0 ── s1 ── s2 ── s3 ── s4
//!                  ▲                 ▲
//!              watermark         newest
//!                  └─ diff(s2,s1), diff(s3,s2), diff(s4,s3) classified
//!                     watermark := s4
//! ```
//!
//! Matching is exact set equality: one extra or missing channel and the
//! pattern does not fire.

use chrono::NaiveDateTime;
use log::info;

use crate::channels::{Channel, ChannelValue};
use crate::history::History;

use crate::channels::ChannelValue::{Off, On};

// ---------------------------------------------------------------------------
// Pattern table
// ---------------------------------------------------------------------------

/// One recognised procedure: the exact changed channels and its label.
#[derive(Debug, Clone, Copy)]
pub struct EventPattern {
    pub changes: &'static [(Channel, ChannelValue)],
    pub label: &'static str,
}

impl EventPattern {
    /// True when `diff` holds exactly this pattern's pairs, in any order.
    pub fn matches(&self, diff: &[(Channel, ChannelValue)]) -> bool {
        diff.len() == self.changes.len() && self.changes.iter().all(|pair| diff.contains(pair))
    }
}

/// Fixed process-wide table.  Keys are disjoint, so lookup order does not
/// matter.  New procedures are added by appending an entry.
pub static EVENT_PATTERNS: &[EventPattern] = &[
    EventPattern {
        changes: &[
            (Channel::HsStill, On),
            (Channel::HsMc, On),
            (Channel::PulseTube, On),
        ],
        label: "Cooldown script started",
    },
    EventPattern {
        changes: &[
            (Channel::Ext, Off),
            (Channel::PulseTube, Off),
            (Channel::V13, On),
            (Channel::V9, Off),
            (Channel::Turbo1, Off),
        ],
        label: "Warmup script started",
    },
    EventPattern {
        changes: &[
            (Channel::PulseTube, Off),
            (Channel::V13, On),
            (Channel::V9, Off),
            (Channel::Turbo1, Off),
        ],
        label: "Warmup script started",
    },
    EventPattern {
        changes: &[(Channel::PulseTube, Off)],
        label: "Pulsetube manual stop",
    },
    EventPattern {
        changes: &[(Channel::PulseTube, On)],
        label: "Pulsetube manual start",
    },
    EventPattern {
        changes: &[
            (Channel::Compressor, On),
            (Channel::V9, On),
            (Channel::V7, On),
            (Channel::V6, On),
            (Channel::V5, On),
        ],
        label: "Condensing script started",
    },
];

/// Label of the pattern equal to `diff`, if any.
pub fn classify(diff: &[(Channel, ChannelValue)]) -> Option<&'static str> {
    EVENT_PATTERNS
        .iter()
        .find(|p| p.matches(diff))
        .map(|p| p.label)
}

// ---------------------------------------------------------------------------
// Watermark
// ---------------------------------------------------------------------------

/// Newest state snapshot already classified.
///
/// Several snapshots can share one whole-second timestamp, so the history
/// position breaks ties.  Ordering is lexicographic on `(at, position)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Watermark {
    pub at: NaiveDateTime,
    pub position: usize,
}

impl Watermark {
    /// Watermark sitting on the newest entry of `history`, or `None` if
    /// the history is empty.
    pub fn at_end_of(history: &History) -> Option<Self> {
        let position = history.len().checked_sub(1)?;
        Some(Self {
            at: history.states()[position].at,
            position,
        })
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct EventClassifier {
    watermark: Option<Watermark>,
}

impl EventClassifier {
    /// Classifier that treats everything currently in `history` as seen.
    pub fn new(history: &History) -> Self {
        Self {
            watermark: Watermark::at_end_of(history),
        }
    }

    pub fn watermark(&self) -> Option<Watermark> {
        self.watermark
    }

    /// Labels of every matching transition newer than the watermark, oldest
    /// first.  The watermark then moves to the newest snapshot, whether or
    /// not anything matched, so each transition is classified once.
    pub fn scan_new_events(&mut self, history: &History) -> Vec<String> {
        let states = history.states();
        let mut labels = Vec::new();

        for idx in (1..states.len()).rev() {
            let here = Watermark {
                at: states[idx].at,
                position: idx,
            };
            if self.watermark.is_some_and(|w| here <= w) {
                break;
            }
            let diff = states[idx].diff(&states[idx - 1]);
            if let Some(label) = classify(&diff) {
                info!("event detected at {}: {label}", states[idx].at);
                labels.push(label.to_string());
            }
        }
        labels.reverse();

        if let Some(newest) = Watermark::at_end_of(history) {
            if self.watermark.is_none_or(|w| newest > w) {
                self.watermark = Some(newest);
            }
        }
        labels
    }
}
