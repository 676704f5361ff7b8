//! Unified error types for the fridge simulator.
//!
//! A single `Error` enum covers every rejection the simulator core can
//! return.  All variants are `Copy` so they can be passed back through the
//! dispatcher and poller without allocation.  Mirror and dispatch failures
//! get their own enums because they never reach the core's callers in the
//! same way: mirror errors are logged and swallowed, dispatch errors wrap
//! core errors with routing context.

use core::fmt;
use std::io;

// ---------------------------------------------------------------------------
// Core errors
// ---------------------------------------------------------------------------

/// Every rejected operation on a fridge instance funnels into this type.
///
/// None of these are fatal: the instance stays fully usable and no state,
/// sensor or history entry is touched when one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The command named a channel outside the fixed channel set.
    UnknownChannel,
    /// The value was not one of `0`, `1`, `2` (string or numeric form).
    InvalidValue,
    /// A history query ran against an instance with no snapshots.
    NoHistory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownChannel => write!(f, "unknown channel"),
            Self::InvalidValue => write!(f, "state value must be 0, 1 or 2"),
            Self::NoHistory => write!(f, "no history recorded"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Mirror errors
// ---------------------------------------------------------------------------

/// Failure of a [`HistoryWriter`](crate::app::ports::HistoryWriter) append
/// or of reparsing a mirrored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorError {
    /// The backing file or directory could not be written or read.
    Io(io::ErrorKind),
    /// A mirrored row did not have the expected shape.
    MalformedRow(&'static str),
}

impl fmt::Display for MirrorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(kind) => write!(f, "mirror I/O failed: {kind}"),
            Self::MalformedRow(why) => write!(f, "malformed row: {why}"),
        }
    }
}

impl std::error::Error for MirrorError {}

impl From<io::Error> for MirrorError {
    fn from(e: io::Error) -> Self {
        Self::Io(e.kind())
    }
}

// ---------------------------------------------------------------------------
// Dispatch errors
// ---------------------------------------------------------------------------

/// Why a named command could not be executed on a fridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// No fridge is registered under the given id.
    UnknownFridge,
    /// The command name is not part of the dispatcher vocabulary.
    UnknownCommand,
    /// A required parameter was absent from the parameter bag.
    MissingParam(&'static str),
    /// The fridge rejected the command.
    Rejected(Error),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFridge => write!(f, "unknown fridge id"),
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::MissingParam(name) => write!(f, "missing parameter '{name}'"),
            Self::Rejected(e) => write!(f, "rejected: {e}"),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<Error> for DispatchError {
    fn from(e: Error) -> Self {
        Self::Rejected(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Simulator-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
