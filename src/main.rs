//! fridgesim host entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  SystemClock   FileMirror / NoMirror   LogEventSink          │
//! │  (Clock)       (HistoryWriter)         (EventSink)           │
//! │  JsonConfigFile (ConfigPort)                                 │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ────────────────        │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │  Poller ─▶ FridgeService ×N                            │  │
//! │  │           StateStore · EventClassifier · Formatter     │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `fridgesim [POLL_CYCLES]` (default 3).  The config file path is
//! read from `FRIDGESIM_CONFIG` (default `fridgesim.json`); log level from
//! `RUST_LOG` (default `info`).

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use log::{info, warn};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use fridgesim::adapters::config_file::JsonConfigFile;
use fridgesim::adapters::file_mirror::FileMirror;
use fridgesim::adapters::log_sink::LogEventSink;
use fridgesim::adapters::time::SystemClock;
use fridgesim::app::commands::Params;
use fridgesim::app::poller::Poller;
use fridgesim::app::ports::{ConfigPort, HistoryWriter, NoMirror};
use fridgesim::app::service::FridgeService;
use fridgesim::config::SimConfig;
use fridgesim::error::MirrorError;
use fridgesim::history::History;
use fridgesim::store::StateStore;

type Mirror = Box<dyn HistoryWriter>;

const DEFAULT_CONFIG_PATH: &str = "fridgesim.json";
const DEFAULT_POLL_CYCLES: u32 = 3;

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  fridgesim v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let cycles = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<u32>()
            .with_context(|| format!("invalid poll cycle count '{arg}'"))?,
        None => DEFAULT_POLL_CYCLES,
    };

    // ── 2. Config (file or defaults) ──────────────────────────
    let config_path =
        std::env::var("FRIDGESIM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = match JsonConfigFile::new(&config_path).load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("config load from {config_path} failed ({e}), using defaults");
            SimConfig::default()
        }
    };

    // ── 3. Fleet ──────────────────────────────────────────────
    let mut poller: Poller<SystemClock, Mirror> = Poller::new(SystemClock);
    for id in &config.fridge_ids {
        poller.add_fridge(build_fridge(&config, id));
    }
    info!("fleet: {:?}", poller.fridge_ids());

    let mut sink = LogEventSink::new();

    // ── 4. Scripted demo on the first fridge ──────────────────
    if let Some(first) = config.fridge_ids.first() {
        run_demo_script(&mut poller, first, &mut sink);
    }

    // ── 5. Poll loop ──────────────────────────────────────────
    let interval = Duration::from_millis(config.poll_interval_ms);
    for cycle in 1..=cycles {
        let new_alerts = poller.poll_once(&mut sink);
        info!("poll {cycle}/{cycles}: {new_alerts} new alert(s)");
        for (id, alerts) in poller.pop_all_alerts() {
            for alert in alerts {
                info!("[{id}] {alert}");
            }
        }
        if cycle < cycles {
            std::thread::sleep(interval);
        }
    }

    for id in poller.fridge_ids() {
        if let Some(reading) = poller.latest(id) {
            info!("{id}:\n{}", reading.message);
        }
    }
    Ok(())
}

/// Fresh fridge, or one resumed from today's mirror if present.  A day
/// that cannot be reloaded is logged and started fresh.
fn build_fridge(config: &SimConfig, id: &str) -> FridgeService<SystemClock, Mirror> {
    let Some(root) = config.mirror_dir.as_deref() else {
        let store = StateStore::new(config, SystemClock, Box::new(NoMirror) as Mirror);
        return FridgeService::new(id, store);
    };

    let mirror = FileMirror::new(root.join(id));
    let loaded = match mirror.load_day(Local::now().date_naive()) {
        Err(MirrorError::Io(io::ErrorKind::NotFound)) => Ok(History::new()),
        other => other,
    };
    let store = StateStore::resume_or_new(config, SystemClock, Box::new(mirror) as Mirror, loaded);
    info!("{id}: {} snapshot(s) in history", store.history().len());
    FridgeService::new(id, store)
}

/// Cooldown script and a few manual steps, the last one rejected.
fn run_demo_script(poller: &mut Poller<SystemClock, Mirror>, id: &str, sink: &mut LogEventSink) {
    let steps = [
        ("toggle_compressor", json!({})),
        (
            "set_channels",
            json!({"channels": {"hs-still": 1, "hs-mc": 1, "pulsetube": 1}}),
        ),
        ("toggle_valve", json!({"valve_name": "v13"})),
        ("set_channel", json!({"channel": "scroll1", "value": "1"})),
        ("set_channel", json!({"channel": "v99", "value": 1})),
    ];
    for (name, params) in steps {
        let params: Params = params.as_object().cloned().unwrap_or_default();
        if let Err(e) = poller.execute_command(id, name, &params, sink) {
            warn!("demo step '{name}' on {id} rejected: {e}");
        }
    }
}
