//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (rendered by the tracing subscriber in the host binary).
//! A time-series or dashboard adapter would implement the same trait.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::channels::ChannelValue;
use crate::sensors::SensorKey;
use crate::status::format_unicode_sci;

/// Adapter that logs every [`AppEvent`] as one line.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(r) => {
                let temp = |key: SensorKey| {
                    r.status
                        .as_ref()
                        .and_then(|s| s.readings.get(key))
                        .map_or_else(|| "-".to_string(), |k| format!("{k:.2}K"))
                };
                let vacuum = r.pressures_mbar.map_or_else(
                    || "-".to_string(),
                    |p| format_unicode_sci(p.iter().copied().fold(f64::INFINITY, f64::min)),
                );
                let on = r
                    .state
                    .channels
                    .iter()
                    .filter(|(_, v)| *v == ChannelValue::On)
                    .map(|(c, _)| c.name())
                    .collect::<Vec<_>>()
                    .join(",");
                info!(
                    "TELEM | {} @ {} | MC={} still={} | vac={}mbar | on=[{}]",
                    r.fridge_id,
                    r.polled_at,
                    temp(SensorKey::MixChamber),
                    temp(SensorKey::Still),
                    vacuum,
                    on,
                );
            }
            AppEvent::ChannelChanged {
                fridge_id,
                channel,
                from,
                to,
            } => {
                info!("STATE | {fridge_id} | {channel}: {from} -> {to}");
            }
            AppEvent::CommandExecuted { fridge_id, command } => {
                info!("CMD   | {fridge_id} | {}", command.name());
            }
            AppEvent::Alert {
                fridge_id,
                label,
                at,
            } => {
                info!("ALERT | {fridge_id} @ {at} | {label}");
            }
        }
    }
}
