//! Fleet poller.
//!
//! Owns every simulated fridge keyed by id, routes commands to them and
//! runs the periodic poll cycle:
//!
//! ```text
//!  for each fridge (sorted by id):
//!      reading  = latest state + status + pressures + message
//!      latest[id] = reading            ──▶ AppEvent::Telemetry
//!      alerts   = scan_new_events()
//!      pending[id] += alerts           ──▶ AppEvent::Alert (one per label)
//! ```
//!
//! An empty scan means "no new alerts", never an error.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::adapters::time::SystemClock;
use crate::config::SimConfig;
use crate::error::DispatchError;
use crate::store::StateStore;

use super::commands::Params;
use super::events::{AppEvent, FridgeReading};
use super::ports::{Clock, EventSink, HistoryWriter, NoMirror};
use super::service::FridgeService;

pub struct Poller<C: Clock = SystemClock, W: HistoryWriter = NoMirror> {
    fridges: BTreeMap<String, FridgeService<C, W>>,
    clock: C,
    latest: BTreeMap<String, FridgeReading>,
    pending_alerts: BTreeMap<String, Vec<String>>,
    poll_count: u64,
}

impl<C: Clock, W: HistoryWriter> Poller<C, W> {
    /// Empty fleet.  `clock` stamps poll times.
    pub fn new(clock: C) -> Self {
        Self {
            fridges: BTreeMap::new(),
            clock,
            latest: BTreeMap::new(),
            pending_alerts: BTreeMap::new(),
            poll_count: 0,
        }
    }

    /// One fresh fridge per configured id, each with its own mirror.
    pub fn from_config(config: &SimConfig, clock: C, mut mirror_for: impl FnMut(&str) -> W) -> Self
    where
        C: Clone,
    {
        let mut poller = Self::new(clock.clone());
        for id in &config.fridge_ids {
            let store = StateStore::new(config, clock.clone(), mirror_for(id));
            poller.add_fridge(FridgeService::new(id.as_str(), store));
        }
        info!("dummy fridges initialized: {:?}", poller.fridge_ids());
        poller
    }

    /// Register a fridge.  Returns `false` (and drops `service`) if the id
    /// is already taken.
    pub fn add_fridge(&mut self, service: FridgeService<C, W>) -> bool {
        if self.fridges.contains_key(service.id()) {
            warn!("fridge id '{}' already registered", service.id());
            return false;
        }
        self.fridges.insert(service.id().to_string(), service);
        true
    }

    /// Known fridge ids, sorted.
    pub fn fridge_ids(&self) -> Vec<&str> {
        self.fridges.keys().map(String::as_str).collect()
    }

    pub fn fridge(&self, id: &str) -> Option<&FridgeService<C, W>> {
        self.fridges.get(id)
    }

    pub fn fridge_mut(&mut self, id: &str) -> Option<&mut FridgeService<C, W>> {
        self.fridges.get_mut(id)
    }

    // ── Commands ──────────────────────────────────────────────

    /// Route a named command to one fridge.
    pub fn execute_command(
        &mut self,
        fridge_id: &str,
        name: &str,
        params: &Params,
        sink: &mut impl EventSink,
    ) -> Result<(), DispatchError> {
        let Some(fridge) = self.fridges.get_mut(fridge_id) else {
            warn!("unknown fridge_id '{fridge_id}'");
            return Err(DispatchError::UnknownFridge);
        };
        fridge.execute(name, params, sink)
    }

    // ── Poll cycle ────────────────────────────────────────────

    /// Run one poll over every fridge.  Returns the number of new alerts.
    pub fn poll_once(&mut self, sink: &mut impl EventSink) -> usize {
        let polled_at = self.clock.now();
        let mut alerts = 0;

        for (id, fridge) in &mut self.fridges {
            match fridge.reading(polled_at) {
                Ok(reading) => {
                    sink.emit(&AppEvent::Telemetry(reading.clone()));
                    self.latest.insert(id.clone(), reading);
                }
                Err(e) => warn!("fridge {id}: no reading: {e}"),
            }

            let labels = fridge.scan_new_events();
            for label in &labels {
                info!("fridge {id}: {label}");
                sink.emit(&AppEvent::Alert {
                    fridge_id: id.clone(),
                    label: label.clone(),
                    at: polled_at,
                });
            }
            alerts += labels.len();
            if !labels.is_empty() {
                self.pending_alerts
                    .entry(id.clone())
                    .or_default()
                    .extend(labels);
            }
        }

        self.poll_count += 1;
        debug!("poll #{} done, {alerts} new alert(s)", self.poll_count);
        alerts
    }

    /// Reading cached by the most recent poll.
    pub fn latest(&self, fridge_id: &str) -> Option<&FridgeReading> {
        self.latest.get(fridge_id)
    }

    /// Drain every pending alert, keyed by fridge id.
    pub fn pop_all_alerts(&mut self) -> BTreeMap<String, Vec<String>> {
        core::mem::take(&mut self.pending_alerts)
    }

    /// Completed poll cycles.
    pub fn poll_count(&self) -> u64 {
        self.poll_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::time::ManualClock;
    use chrono::NaiveDate;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder(Vec<AppEvent>);

    impl EventSink for Recorder {
        fn emit(&mut self, event: &AppEvent) {
            self.0.push(event.clone());
        }
    }

    fn poller() -> (Poller<ManualClock>, ManualClock) {
        let start = NaiveDate::from_ymd_opt(2025, 7, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        let clock = ManualClock::new(start);
        let p = Poller::from_config(&SimConfig::default(), clock.clone(), |_| NoMirror);
        (p, clock)
    }

    #[test]
    fn fleet_comes_from_config() {
        let (p, _) = poller();
        assert_eq!(p.fridge_ids(), vec!["fridge_1", "fridge_2"]);
        assert!(p.latest("fridge_1").is_none());
    }

    #[test]
    fn duplicate_ids_are_refused() {
        let (mut p, clock) = poller();
        let store = StateStore::new(&SimConfig::default(), clock, NoMirror);
        assert!(!p.add_fridge(FridgeService::new("fridge_1", store)));
        assert_eq!(p.fridge_ids().len(), 2);
    }

    #[test]
    fn unknown_fridge_is_reported() {
        let (mut p, _) = poller();
        let mut sink = Recorder::default();
        assert_eq!(
            p.execute_command("fridge_9", "toggle_turbo", &Params::new(), &mut sink),
            Err(DispatchError::UnknownFridge)
        );
        assert!(sink.0.is_empty());
    }

    #[test]
    fn poll_caches_readings_and_harvests_alerts() {
        let (mut p, clock) = poller();
        let mut sink = Recorder::default();

        assert_eq!(p.poll_once(&mut sink), 0);
        assert_eq!(sink.0.len(), 2);
        assert!(p.pop_all_alerts().is_empty());

        clock.advance(5);
        p.execute_command("fridge_2", "toggle_pulsetube", &Params::new(), &mut sink)
            .unwrap();
        sink.0.clear();

        clock.advance(5);
        assert_eq!(p.poll_once(&mut sink), 1);
        let alerts: Vec<_> = sink
            .0
            .iter()
            .filter_map(|e| match e {
                AppEvent::Alert { fridge_id, label, .. } => Some((fridge_id.as_str(), label.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(alerts, vec![("fridge_2", "Pulsetube manual start")]);

        let latest = p.latest("fridge_2").unwrap();
        assert_eq!(latest.polled_at, clock.current());
        assert!(latest.message.starts_with("**System Status**"));

        let pending = p.pop_all_alerts();
        assert_eq!(pending.get("fridge_2"), Some(&vec!["Pulsetube manual start".to_string()]));
        assert!(p.pop_all_alerts().is_empty());

        assert_eq!(p.poll_once(&mut sink), 0);
        assert_eq!(p.poll_count(), 3);
    }

    #[test]
    fn rejected_command_leaves_fleet_untouched() {
        let (mut p, _) = poller();
        let mut sink = Recorder::default();
        let err = p.execute_command(
            "fridge_1",
            "set_channel",
            &json!({"channel": "v99", "value": 1}).as_object().cloned().unwrap(),
            &mut sink,
        );
        assert!(err.is_err());
        assert_eq!(p.fridge("fridge_1").unwrap().store().history().len(), 1);
    }
}
