//! Authoritative channel values and the append-only history.
//!
//! [`StateStore`] owns everything that changes when a fridge is commanded:
//! the live channel array, the live sensor readings and pressures, and the
//! three synchronized history sequences.  One accepted mutation runs:
//!
//! ```text
//!  validate name + value ──▶ no-op if unchanged
//!          │
//!          ▼
//!  SensorModel::derive (pure) ──▶ commit channel, readings, pressures
//!          │
//!          ▼
//!  push state/status/pressure @ same timestamp ──▶ mirror (best effort)
//! ```
//!
//! Validation happens before anything is touched, so a rejected command
//! leaves no trace.  Mirror failures are logged and swallowed; in-memory
//! history stays authoritative.

use chrono::{NaiveDateTime, Timelike};
use log::{debug, info, warn};

use crate::adapters::time::SystemClock;
use crate::app::ports::{Clock, HistoryWriter, NoMirror};
use crate::channels::{Channel, ChannelInput, ChannelKind, ChannelStates, ChannelValue};
use crate::config::SimConfig;
use crate::error::{Error, MirrorError, Result};
use crate::history::{
    History, HistoryRecord, PressureSnapshot, StateChange, StateSnapshot, StatusSnapshot,
};
use crate::sensors::{GAUGE_COUNT, Pressures, SensorModel, SensorReadings};

pub struct StateStore<C: Clock = SystemClock, W: HistoryWriter = NoMirror> {
    channels: ChannelStates,
    readings: SensorReadings,
    pressures: Pressures,
    model: SensorModel,
    history: History,
    clock: C,
    mirror: W,
}

impl StateStore {
    /// Store on the wall clock with in-memory history only.
    pub fn in_memory(config: &SimConfig) -> Self {
        Self::new(config, SystemClock, NoMirror)
    }
}

impl<C: Clock, W: HistoryWriter> StateStore<C, W> {
    /// Build a warm, idle fridge and seed the initial snapshot triple.
    pub fn new(config: &SimConfig, clock: C, mirror: W) -> Self {
        let mut store = Self {
            channels: ChannelStates::all_off(),
            readings: SensorReadings::initial(
                config.initial_temperature_k,
                config.initial_water_c,
                config.water_sensor_variant,
            ),
            pressures: Pressures::uniform(config.initial_pressure_mbar),
            model: SensorModel::new(config.model.clone()),
            history: History::new(),
            clock,
            mirror,
        };
        store.commit();
        store
    }

    /// Resume from a previously recorded history (e.g. reloaded from the
    /// mirror).  Live values are taken from the newest entries; nothing is
    /// appended.
    pub fn from_history(
        config: &SimConfig,
        clock: C,
        mirror: W,
        history: History,
    ) -> Result<Self> {
        let (channels, readings, pressures) = Self::live_values(&history)?;
        Ok(Self {
            channels,
            readings,
            pressures,
            model: SensorModel::new(config.model.clone()),
            history,
            clock,
            mirror,
        })
    }

    /// Resume from the outcome of a history reload, or seed a fresh store
    /// when it failed or came back empty.  A failed reload is logged; the
    /// fresh store keeps mirroring to `mirror`.
    pub fn resume_or_new(
        config: &SimConfig,
        clock: C,
        mirror: W,
        loaded: core::result::Result<History, MirrorError>,
    ) -> Self {
        let history = match loaded {
            Ok(history) => history,
            Err(e) => {
                warn!("history reload failed ({e}), starting fresh");
                return Self::new(config, clock, mirror);
            }
        };
        match Self::live_values(&history) {
            Ok((channels, readings, pressures)) => {
                info!("resuming from {} recorded snapshots", history.len());
                Self {
                    channels,
                    readings,
                    pressures,
                    model: SensorModel::new(config.model.clone()),
                    history,
                    clock,
                    mirror,
                }
            }
            Err(_) => {
                debug!("no recorded history, starting fresh");
                Self::new(config, clock, mirror)
            }
        }
    }

    fn live_values(history: &History) -> Result<(ChannelStates, SensorReadings, Pressures)> {
        let state = history.state_at_depth(0)?;
        let status = history.latest_status().ok_or(Error::NoHistory)?;
        let pressures = history.latest_pressures().ok_or(Error::NoHistory)?;
        Ok((state.channels, status.readings.clone(), pressures.pressures))
    }

    // ── Mutation ──────────────────────────────────────────────

    /// Set a channel by name.  Unknown names fail with `UnknownChannel`,
    /// values outside `{0, 1, 2}` with `InvalidValue`; neither touches
    /// any state.  Setting the current value is a no-op.
    pub fn set_channel(&mut self, name: &str, value: impl ChannelInput) -> Result<()> {
        let channel = Channel::from_name(name).ok_or(Error::UnknownChannel)?;
        let value = value.to_channel_value()?;
        self.set(channel, value);
        Ok(())
    }

    /// Typed set.  Returns `true` if the value changed and a snapshot
    /// triple was appended.
    pub fn set(&mut self, channel: Channel, value: ChannelValue) -> bool {
        self.apply(&[(channel, value)])
    }

    /// Move several channels in one transition, the way a scripted
    /// procedure does.  Pairs that equal the current value are skipped;
    /// the rest are derived in order and committed as a single snapshot
    /// triple.  Returns `false` (and appends nothing) if no pair changed.
    pub fn apply(&mut self, changes: &[(Channel, ChannelValue)]) -> bool {
        let mut channels = self.channels;
        let mut readings = self.readings.clone();
        let mut pressures = self.pressures;

        for &(channel, value) in changes {
            if channels.get(channel) == value {
                continue;
            }
            (readings, pressures) = self.model.derive(channel, value, &readings, pressures);
            channels.set(channel, value);
            debug!("{channel} -> {value}");
        }
        // A batch that sets a channel and then restores it is a no-op too.
        if channels == self.channels {
            return false;
        }

        self.channels = channels;
        self.readings = readings;
        self.pressures = pressures;
        self.commit();

        debug!("transition committed, history len {}", self.history.len());
        true
    }

    /// Name/raw-value form of [`apply`](Self::apply).  Every pair is
    /// validated before any is applied, so one bad pair rejects the batch.
    pub fn set_channels<I: ChannelInput>(&mut self, pairs: &[(&str, I)]) -> Result<bool> {
        let mut changes = Vec::with_capacity(pairs.len());
        for (name, raw) in pairs {
            let channel = Channel::from_name(name).ok_or(Error::UnknownChannel)?;
            changes.push((channel, raw.to_channel_value()?));
        }
        Ok(self.apply(&changes))
    }

    /// Flip a channel by name between `Off` and `On`.  `Transitional`
    /// counts as `Off`.
    pub fn toggle(&mut self, name: &str) -> Result<()> {
        let channel = Channel::from_name(name).ok_or(Error::UnknownChannel)?;
        self.toggle_channel(channel);
        Ok(())
    }

    pub fn toggle_channel(&mut self, channel: Channel) {
        let next = self.channels.get(channel).toggled();
        self.set(channel, next);
    }

    pub fn toggle_pulsetube(&mut self) {
        self.toggle_channel(Channel::PulseTube);
    }

    pub fn toggle_compressor(&mut self) {
        self.toggle_channel(Channel::Compressor);
    }

    pub fn toggle_turbo(&mut self) {
        self.toggle_channel(Channel::Turbo1);
    }

    /// Toggle a valve (`v5`, `v6`, …).  Non-valve names are unknown here.
    pub fn toggle_valve(&mut self, name: &str) -> Result<()> {
        self.toggle_of_kind(name, ChannelKind::Valve)
    }

    /// Toggle a heat switch (`hs-still`, `hs-mc`).
    pub fn toggle_heat_switch(&mut self, name: &str) -> Result<()> {
        self.toggle_of_kind(name, ChannelKind::HeatSwitch)
    }

    fn toggle_of_kind(&mut self, name: &str, kind: ChannelKind) -> Result<()> {
        match Channel::from_name(name) {
            Some(channel) if channel.kind() == kind => {
                self.toggle_channel(channel);
                Ok(())
            }
            _ => Err(Error::UnknownChannel),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn value(&self, channel: Channel) -> ChannelValue {
        self.channels.get(channel)
    }

    pub fn channels(&self) -> &ChannelStates {
        &self.channels
    }

    /// Live sensor readings (equal to the newest status snapshot).
    pub fn readings(&self) -> &SensorReadings {
        &self.readings
    }

    /// State snapshot `depth` entries back (0 = current), clamped to the
    /// oldest entry.
    pub fn latest_state(&self, depth: usize) -> Result<&StateSnapshot> {
        self.history.state_at_depth(depth)
    }

    pub fn latest_status(&self) -> Option<&StatusSnapshot> {
        self.history.latest_status()
    }

    pub fn latest_pressures(&self) -> Option<[f64; GAUGE_COUNT]> {
        self.history.latest_pressures().map(|p| p.pressures.readings())
    }

    pub fn last_state_change(&self) -> Option<StateChange> {
        self.history.last_state_change()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn mirror(&self) -> &W {
        &self.mirror
    }

    pub fn mirror_mut(&mut self) -> &mut W {
        &mut self.mirror
    }

    // ── Internal ──────────────────────────────────────────────

    /// Whole-second timestamp, never earlier than the newest entry.
    fn next_stamp(&mut self) -> NaiveDateTime {
        let now = self.clock.now();
        let now = now.with_nanosecond(0).unwrap_or(now);
        match self.history.states().last() {
            Some(last) if now < last.at => last.at,
            _ => now,
        }
    }

    /// Append the live values as one snapshot triple, then mirror it.
    fn commit(&mut self) {
        let at = self.next_stamp();
        self.history.push(
            StateSnapshot {
                at,
                channels: self.channels,
            },
            StatusSnapshot {
                at,
                readings: self.readings.clone(),
            },
            PressureSnapshot {
                at,
                pressures: self.pressures,
            },
        );

        let (Some(state), Some(status), Some(pressure)) = (
            self.history.states().last(),
            self.history.latest_status(),
            self.history.latest_pressures(),
        ) else {
            return;
        };
        for record in [
            HistoryRecord::State(state),
            HistoryRecord::Status(status),
            HistoryRecord::Pressure(pressure),
        ] {
            if let Err(e) = self.mirror.append(&record) {
                warn!(
                    "mirror append to {} failed, keeping in-memory copy: {e}",
                    record.stream().file_name()
                );
            }
        }
    }
}
