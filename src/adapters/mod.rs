//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements    | Connects to                    |
//! |----------------|---------------|--------------------------------|
//! | `config_file`  | ConfigPort    | JSON file on disk              |
//! | `file_mirror`  | HistoryWriter | Per-day CSV files              |
//! | `log_sink`     | EventSink     | `log` facade                   |
//! | `memory`       | HistoryWriter | In-memory row capture          |
//! | `time`         | Clock         | Local wall clock / manual clock|

pub mod config_file;
pub mod file_mirror;
pub mod log_sink;
pub mod memory;
pub mod time;
