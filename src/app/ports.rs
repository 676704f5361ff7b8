//! Port traits: the hexagonal boundary between the simulator core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ StateStore / FridgeService / Poller (domain)
//! ```
//!
//! Driven adapters (clocks, history mirrors, event sinks, config storage)
//! implement these traits.  The domain consumes them via generics, so the
//! core never touches the filesystem or the wall clock directly.

use chrono::NaiveDateTime;

use crate::config::SimConfig;
use crate::error::MirrorError;
use crate::history::HistoryRecord;

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: wall clock → domain)
// ───────────────────────────────────────────────────────────────

/// Source of snapshot timestamps.
pub trait Clock {
    /// Current local time.  Sub-second precision is discarded by the store.
    fn now(&mut self) -> NaiveDateTime;
}

// ───────────────────────────────────────────────────────────────
// History writer port (driven adapter: domain → mirror storage)
// ───────────────────────────────────────────────────────────────

/// Mirrors every appended history entry somewhere outside memory.
///
/// Called synchronously once per stream per committed mutation.  A failed
/// append is logged by the caller and never rolls back in-memory state.
pub trait HistoryWriter {
    fn append(&mut self, record: &HistoryRecord<'_>) -> Result<(), MirrorError>;
}

/// Writer that discards everything; in-memory history only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMirror;

impl HistoryWriter for NoMirror {
    fn append(&mut self, _record: &HistoryRecord<'_>) -> Result<(), MirrorError> {
        Ok(())
    }
}

impl<W: HistoryWriter + ?Sized> HistoryWriter for Box<W> {
    fn append(&mut self, record: &HistoryRecord<'_>) -> Result<(), MirrorError> {
        (**self).append(record)
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / time-series sink)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (log output, a
/// time-series database, a dashboard cache, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists simulator configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration.  Returns [`SimConfig::default()`] if no stored
    /// config exists.
    fn load(&self) -> Result<SimConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SimConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage.
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
