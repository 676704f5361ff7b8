//! Per-day tabular history mirror.
//!
//! Implements [`HistoryWriter`] by appending one comma-separated row per
//! snapshot to day-partitioned files:
//!
//! ```text
//! <root>/
//! └── 14-03-25/
//!     ├── Channels.csv    state rows
//!     ├── Status.csv      sensor rows
//!     └── maxigauge.csv   pressure rows
//! ```
//!
//! Files have no header and are only ever appended to.  The day directory
//! is created on first write.  [`FileMirror::load_day`] reparses a day back
//! into a [`History`] for resuming a fridge.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, info};

use crate::app::ports::HistoryWriter;
use crate::error::MirrorError;
use crate::history::rows::DATE_FORMAT;
use crate::history::{History, HistoryRecord, Stream};

pub struct FileMirror {
    root: PathBuf,
}

impl FileMirror {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        info!("FileMirror: mirroring history under {}", root.display());
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn day_dir(&self, day: NaiveDate) -> PathBuf {
        self.root.join(day.format(DATE_FORMAT).to_string())
    }

    pub fn stream_path(&self, day: NaiveDate, stream: Stream) -> PathBuf {
        self.day_dir(day).join(stream.file_name())
    }

    /// Reparse one day of mirrored history.  A missing stream file reads as
    /// empty; a missing day directory is an error.
    pub fn load_day(&self, day: NaiveDate) -> Result<History, MirrorError> {
        let dir = self.day_dir(day);
        if !dir.is_dir() {
            return Err(MirrorError::Io(io::ErrorKind::NotFound));
        }
        let [states, statuses, pressures] =
            Stream::ALL.map(|stream| read_or_empty(&dir.join(stream.file_name())));
        let (states, statuses, pressures) = (states?, statuses?, pressures?);
        let history = History::from_rows(states.lines(), statuses.lines(), pressures.lines())?;
        info!(
            "FileMirror: loaded {} snapshot(s) from {}",
            history.len(),
            dir.display()
        );
        Ok(history)
    }

    /// Days present under the root, oldest first.  Directories whose name
    /// is not a `dd-mm-yy` date are ignored.
    pub fn days(&self) -> Result<Vec<NaiveDate>, MirrorError> {
        let mut days: Vec<NaiveDate> = fs::read_dir(&self.root)?
            .filter_map(core::result::Result::ok)
            .filter(|e| e.path().is_dir())
            .filter_map(|e| {
                let name = e.file_name();
                NaiveDate::parse_from_str(name.to_str()?, DATE_FORMAT).ok()
            })
            .collect();
        days.sort_unstable();
        Ok(days)
    }
}

fn read_or_empty(path: &Path) -> Result<String, MirrorError> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

impl HistoryWriter for FileMirror {
    fn append(&mut self, record: &HistoryRecord<'_>) -> Result<(), MirrorError> {
        let dir = self.root.join(record.day());
        fs::create_dir_all(&dir)?;
        let path = dir.join(record.stream().file_name());
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{}", record.to_line())?;
        debug!("FileMirror: appended to {}", path.display());
        Ok(())
    }
}
