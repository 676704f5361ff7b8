//! Fridge service: one simulated instrument behind a clean API.
//!
//! [`FridgeService`] pairs a [`StateStore`] with its [`EventClassifier`]
//! and adds the command boundary.  All I/O flows through port traits
//! injected at construction (clock, history mirror) or at call sites
//! (event sink), so the service is testable with mock adapters.
//!
//! ```text
//!  FridgeCommand ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                    │        FridgeService         │
//!          Clock ──▶ │  StateStore · Classifier     │ ──▶ HistoryWriter
//!                    └──────────────────────────────┘
//! ```

use chrono::NaiveDateTime;
use log::{info, warn};
use serde_json::Value;

use crate::adapters::time::SystemClock;
use crate::channels::ChannelStates;
use crate::error::{DispatchError, Result};
use crate::events::EventClassifier;
use crate::status::StatusFormatter;
use crate::store::StateStore;

use super::commands::{FridgeCommand, Params};
use super::events::{AppEvent, FridgeReading};
use super::ports::{Clock, EventSink, HistoryWriter, NoMirror};

// ───────────────────────────────────────────────────────────────
// FridgeService
// ───────────────────────────────────────────────────────────────

pub struct FridgeService<C: Clock = SystemClock, W: HistoryWriter = NoMirror> {
    id: String,
    store: StateStore<C, W>,
    classifier: EventClassifier,
}

impl<C: Clock, W: HistoryWriter> FridgeService<C, W> {
    /// Wrap a store.  History already in the store counts as seen, so a
    /// resumed fridge does not re-announce old procedures.
    pub fn new(id: impl Into<String>, store: StateStore<C, W>) -> Self {
        let classifier = EventClassifier::new(store.history());
        let id = id.into();
        info!("fridge {id} ready, {} snapshot(s) in history", store.history().len());
        Self {
            id,
            store,
            classifier,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn store(&self) -> &StateStore<C, W> {
        &self.store
    }

    /// Direct store access for scripted scenarios.  Changes made here do
    /// not emit `ChannelChanged` events.
    pub fn store_mut(&mut self) -> &mut StateStore<C, W> {
        &mut self.store
    }

    // ── Command handling ──────────────────────────────────────

    /// Execute a parsed command.  On rejection nothing changed and nothing
    /// is emitted.
    pub fn handle_command(
        &mut self,
        cmd: &FridgeCommand,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let before = *self.store.channels();

        match cmd {
            FridgeCommand::ToggleCompressor => self.store.toggle_compressor(),
            FridgeCommand::TogglePulsetube => self.store.toggle_pulsetube(),
            FridgeCommand::ToggleTurbo => self.store.toggle_turbo(),
            FridgeCommand::ToggleValve { valve_name } => self.store.toggle_valve(valve_name)?,
            FridgeCommand::ToggleHeatSwitch { heat_switch_name } => {
                self.store.toggle_heat_switch(heat_switch_name)?;
            }
            FridgeCommand::SetChannel { channel, value } => {
                self.store.set_channel(channel, value.clone())?;
            }
            FridgeCommand::SetChannels { channels } => {
                let pairs: Vec<(&str, Value)> = channels
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.clone()))
                    .collect();
                self.store.set_channels(&pairs)?;
            }
        }

        self.emit_changes(&before, sink);
        sink.emit(&AppEvent::CommandExecuted {
            fridge_id: self.id.clone(),
            command: cmd.clone(),
        });
        Ok(())
    }

    /// Parse and execute a named command with a JSON parameter bag.
    pub fn execute(
        &mut self,
        name: &str,
        params: &Params,
        sink: &mut impl EventSink,
    ) -> core::result::Result<(), DispatchError> {
        let outcome = FridgeCommand::parse(name, params)
            .and_then(|cmd| self.handle_command(&cmd, sink).map_err(DispatchError::from));
        if let Err(e) = &outcome {
            warn!("fridge {}: command '{}' failed: {e}", self.id, name.trim());
        }
        outcome
    }

    // ── Queries ───────────────────────────────────────────────

    /// Rendered status summary of the newest snapshots.
    pub fn state_message(&self) -> Result<String> {
        let state = self.store.latest_state(0)?;
        Ok(StatusFormatter::render(
            state,
            self.store.latest_status(),
            self.store.latest_pressures().as_ref(),
        ))
    }

    /// Snapshot for telemetry and the poller cache.
    pub fn reading(&self, polled_at: NaiveDateTime) -> Result<FridgeReading> {
        Ok(FridgeReading {
            fridge_id: self.id.clone(),
            polled_at,
            state: *self.store.latest_state(0)?,
            status: self.store.latest_status().cloned(),
            pressures_mbar: self.store.latest_pressures(),
            message: self.state_message()?,
        })
    }

    /// Labels of operational procedures recorded since the last scan.
    pub fn scan_new_events(&mut self) -> Vec<String> {
        self.classifier.scan_new_events(self.store.history())
    }

    // ── Internal ──────────────────────────────────────────────

    fn emit_changes(&self, before: &ChannelStates, sink: &mut impl EventSink) {
        for (channel, to) in self.store.channels().diff(before) {
            sink.emit(&AppEvent::ChannelChanged {
                fridge_id: self.id.clone(),
                channel,
                from: before.get(channel),
                to,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::time::ManualClock;
    use crate::channels::{Channel, ChannelValue};
    use crate::config::SimConfig;
    use crate::error::Error;
    use chrono::NaiveDate;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder(Vec<AppEvent>);

    impl EventSink for Recorder {
        fn emit(&mut self, event: &AppEvent) {
            self.0.push(event.clone());
        }
    }

    fn service() -> FridgeService<ManualClock> {
        let start = NaiveDate::from_ymd_opt(2025, 5, 5)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let store = StateStore::new(
            &SimConfig::default(),
            ManualClock::with_step(start, 1),
            NoMirror,
        );
        FridgeService::new("fridge_1", store)
    }

    fn params(v: serde_json::Value) -> Params {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn accepted_command_emits_change_then_execution() {
        let mut svc = service();
        let mut sink = Recorder::default();
        svc.handle_command(&FridgeCommand::TogglePulsetube, &mut sink)
            .unwrap();

        assert_eq!(sink.0.len(), 2);
        assert!(matches!(
            &sink.0[0],
            AppEvent::ChannelChanged {
                channel: Channel::PulseTube,
                from: ChannelValue::Off,
                to: ChannelValue::On,
                ..
            }
        ));
        assert!(matches!(&sink.0[1], AppEvent::CommandExecuted { .. }));
    }

    #[test]
    fn rejected_command_emits_nothing() {
        let mut svc = service();
        let mut sink = Recorder::default();
        let err = svc.execute(
            "set_channel",
            &params(json!({"channel": "v5", "value": 3})),
            &mut sink,
        );
        assert_eq!(err, Err(DispatchError::Rejected(Error::InvalidValue)));
        assert!(sink.0.is_empty());
        assert_eq!(svc.store().history().len(), 1);
    }

    #[test]
    fn no_op_command_still_counts_as_executed() {
        let mut svc = service();
        let mut sink = Recorder::default();
        svc.execute(
            "set_channel",
            &params(json!({"channel": "v5", "value": "0"})),
            &mut sink,
        )
        .unwrap();
        assert_eq!(sink.0.len(), 1);
        assert!(matches!(&sink.0[0], AppEvent::CommandExecuted { .. }));
    }

    #[test]
    fn reading_carries_rendered_message() {
        let mut svc = service();
        let mut sink = Recorder::default();
        svc.execute("toggle_pulsetube", &Params::new(), &mut sink)
            .unwrap();
        let polled = svc.store().latest_state(0).unwrap().at;
        let r = svc.reading(polled).unwrap();
        assert_eq!(r.fridge_id, "fridge_1");
        assert_eq!(r.state.get(Channel::PulseTube), ChannelValue::On);
        assert!(r.message.contains("🟡pt"));
        assert_eq!(r.pressures_mbar, Some([1.0e-3; 6]));
    }

    #[test]
    fn scan_reports_each_procedure_once() {
        let mut svc = service();
        let mut sink = Recorder::default();
        svc.execute(
            "set_channels",
            &params(json!({"channels": {"hs-still": 1, "hs-mc": 1, "pulsetube": 1}})),
            &mut sink,
        )
        .unwrap();
        assert_eq!(svc.scan_new_events(), vec!["Cooldown script started"]);
        assert!(svc.scan_new_events().is_empty());
    }
}
