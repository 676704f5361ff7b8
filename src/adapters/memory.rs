//! In-memory history mirror.
//!
//! Keeps the encoded rows of every stream instead of writing files.  Used
//! when row capture is wanted without touching disk, and by tests that
//! check the mirrored format.

use crate::app::ports::HistoryWriter;
use crate::error::MirrorError;
use crate::history::{History, HistoryRecord, Stream};

#[derive(Debug, Clone, Default)]
pub struct MemoryMirror {
    states: Vec<String>,
    statuses: Vec<String>,
    pressures: Vec<String>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows captured for `stream`, oldest first.
    pub fn lines(&self, stream: Stream) -> &[String] {
        match stream {
            Stream::State => &self.states,
            Stream::Status => &self.statuses,
            Stream::Pressure => &self.pressures,
        }
    }

    /// Reparse everything captured so far.
    pub fn replay(&self) -> Result<History, MirrorError> {
        History::from_rows(
            self.states.iter().map(String::as_str),
            self.statuses.iter().map(String::as_str),
            self.pressures.iter().map(String::as_str),
        )
    }
}

impl HistoryWriter for MemoryMirror {
    fn append(&mut self, record: &HistoryRecord<'_>) -> Result<(), MirrorError> {
        let line = record.to_line();
        match record.stream() {
            Stream::State => self.states.push(line),
            Stream::Status => self.statuses.push(line),
            Stream::Pressure => self.pressures.push(line),
        }
        Ok(())
    }
}
