//! Deterministic sensor derivation from channel transitions.
//!
//! | Transition                     | Effect                                              |
//! |--------------------------------|-----------------------------------------------------|
//! | `pulsetube → On`               | MC and still drop by the cool step, floored         |
//! | `pulsetube → Off/Transitional` | MC and still rise by the warm step, capped at ambient |
//! | `compressor → Off`             | water in/out rise by the water step, capped         |
//! | `compressor → On/Transitional` | water in/out drop by the water step, floored        |
//! | `turbo1 → any`                 | turbo "at speed" flag reset to 0                    |
//! | `scroll1/scroll2/turbo1 → On`  | pressures divide by the pressure factor             |
//! | `scroll1/scroll2/turbo1 → else`| pressures multiply by the pressure factor           |
//!
//! The model never touches the live store: it takes the current readings
//! by reference and returns the next ones, so a rejected command can never
//! leave half-derived values behind.

use crate::channels::{Channel, ChannelKind, ChannelValue};
use crate::config::SensorModelConfig;

use super::{Pressures, SensorKey, SensorReadings, WaterSensorVariant};

/// Pure physical heuristics, parameterised by [`SensorModelConfig`].
#[derive(Debug, Clone, Default)]
pub struct SensorModel {
    cfg: SensorModelConfig,
}

impl SensorModel {
    pub fn new(cfg: SensorModelConfig) -> Self {
        Self { cfg }
    }

    /// Readings and pressures after `channel` moved to `value`.
    pub fn derive(
        &self,
        channel: Channel,
        value: ChannelValue,
        readings: &SensorReadings,
        pressures: Pressures,
    ) -> (SensorReadings, Pressures) {
        let mut next = readings.clone();

        match channel {
            Channel::PulseTube => self.apply_pulsetube(value, &mut next),
            Channel::Compressor => self.apply_compressor(value, &mut next),
            Channel::Turbo1 => next.set(SensorKey::TurboAtSpeed, 0.0),
            _ => {}
        }

        let next_pressures = if channel.kind() == ChannelKind::VacuumPump {
            if value == ChannelValue::On {
                pressures.improved(self.cfg.pressure_factor)
            } else {
                pressures.worsened(self.cfg.pressure_factor)
            }
        } else {
            pressures
        };

        (next, next_pressures)
    }

    fn apply_pulsetube(&self, value: ChannelValue, r: &mut SensorReadings) {
        let c = &self.cfg;
        for (key, floor) in [
            (SensorKey::MixChamber, c.mix_chamber_floor_k),
            (SensorKey::Still, c.still_floor_k),
        ] {
            let Some(t) = r.get(key) else { continue };
            let t = if value == ChannelValue::On {
                (t - c.pulsetube_cool_step_k).max(floor)
            } else {
                (t + c.pulsetube_warm_step_k).min(c.ambient_k)
            };
            r.set(key, t);
        }
    }

    fn apply_compressor(&self, value: ChannelValue, r: &mut SensorReadings) {
        let c = &self.cfg;
        let Some(variant) = WaterSensorVariant::detect(r) else {
            return;
        };
        let (water_in, water_out) = variant.keys();
        for key in [water_in, water_out] {
            let Some(t) = r.get(key) else { continue };
            let t = if value == ChannelValue::Off {
                (t + c.water_step_c).min(c.water_cap_c)
            } else {
                (t - c.water_step_c).max(c.water_floor_c)
            };
            r.set(key, t);
        }
    }
}
