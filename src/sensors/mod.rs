//! Sensor subsystem: simulated readings and the [`SensorModel`] that
//! derives them from channel transitions.
//!
//! Readings are a small ordered map from [`SensorKey`] to a number.  The
//! map form matters: real compressors report their cooling-water sensors
//! under one of two spellings, and consumers detect which one is present.

pub mod model;
pub mod pressure;

use core::fmt;

use serde::{Deserialize, Serialize};

pub use model::SensorModel;
pub use pressure::{GAUGE_COUNT, Pressures};

/// Maximum number of distinct sensors in one reading set.
pub const MAX_SENSORS: usize = 8;

/// Every sensor the simulator knows how to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKey {
    /// Mixing-chamber temperature (K).
    #[serde(rename = "mix_chamber")]
    MixChamber,
    /// Still temperature (K).
    #[serde(rename = "still")]
    Still,
    /// Intermediate-stage plate temperature (K).
    #[serde(rename = "platform")]
    Platform,
    /// Compressor water inlet (°C), standard spelling.
    #[serde(rename = "cptempwi")]
    WaterIn,
    /// Compressor water outlet (°C), standard spelling.
    #[serde(rename = "cptempwo")]
    WaterOut,
    /// Compressor water inlet (°C), alternate spelling.
    #[serde(rename = "cpatempwi")]
    AltWaterIn,
    /// Compressor water outlet (°C), alternate spelling.
    #[serde(rename = "cpatempwo")]
    AltWaterOut,
    /// Turbo controller "set speed attained" flag (0 or 1).
    #[serde(rename = "tc400setspdatt")]
    TurboAtSpeed,
}

impl SensorKey {
    pub const ALL: [SensorKey; MAX_SENSORS] = [
        Self::MixChamber,
        Self::Still,
        Self::Platform,
        Self::WaterIn,
        Self::WaterOut,
        Self::AltWaterIn,
        Self::AltWaterOut,
        Self::TurboAtSpeed,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::MixChamber => "mix_chamber",
            Self::Still => "still",
            Self::Platform => "platform",
            Self::WaterIn => "cptempwi",
            Self::WaterOut => "cptempwo",
            Self::AltWaterIn => "cpatempwi",
            Self::AltWaterOut => "cpatempwo",
            Self::TurboAtSpeed => "tc400setspdatt",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which spelling a compressor uses for its cooling-water sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterSensorVariant {
    /// `cptempwi` / `cptempwo`.
    #[default]
    Standard,
    /// `cpatempwi` / `cpatempwo`.
    Alternate,
}

impl WaterSensorVariant {
    /// `(inlet, outlet)` keys for this spelling.
    pub const fn keys(self) -> (SensorKey, SensorKey) {
        match self {
            Self::Standard => (SensorKey::WaterIn, SensorKey::WaterOut),
            Self::Alternate => (SensorKey::AltWaterIn, SensorKey::AltWaterOut),
        }
    }

    /// Detect the spelling present in `readings`, keyed on the outlet
    /// sensor.  The standard spelling wins if both are present.
    pub fn detect(readings: &SensorReadings) -> Option<Self> {
        if readings.contains(SensorKey::WaterOut) {
            Some(Self::Standard)
        } else if readings.contains(SensorKey::AltWaterOut) {
            Some(Self::Alternate)
        } else {
            None
        }
    }
}

/// Ordered sensor-name → value map.  Insertion order is preserved and is
/// the order used in mirrored status rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorReadings {
    entries: heapless::Vec<(SensorKey, f64), MAX_SENSORS>,
}

impl SensorReadings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Baseline readings of a warm, idle fridge.
    pub fn initial(temperature_k: f64, water_c: f64, variant: WaterSensorVariant) -> Self {
        let (water_in, water_out) = variant.keys();
        let mut r = Self::new();
        r.set(SensorKey::MixChamber, temperature_k);
        r.set(SensorKey::Still, temperature_k);
        r.set(SensorKey::Platform, temperature_k);
        r.set(water_in, water_c);
        r.set(water_out, water_c);
        r.set(SensorKey::TurboAtSpeed, 0.0);
        r
    }

    pub fn get(&self, key: SensorKey) -> Option<f64> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    pub fn contains(&self, key: SensorKey) -> bool {
        self.entries.iter().any(|(k, _)| *k == key)
    }

    /// Update `key` in place, or append it if absent.
    pub fn set(&mut self, key: SensorKey, value: f64) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            // Capacity equals the number of distinct keys.
            let _ = self.entries.push((key, value));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SensorKey, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the turbo controller reports set speed attained.
    pub fn turbo_at_speed(&self) -> bool {
        self.get(SensorKey::TurboAtSpeed)
            .is_some_and(|v| (v - 1.0).abs() < f64::EPSILON)
    }
}
