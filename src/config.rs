//! Simulator configuration parameters
//!
//! All tunable parameters for the dummy fridge fleet.  Values can be
//! overridden from a JSON file through the [`ConfigPort`](crate::app::ports::ConfigPort).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::sensors::WaterSensorVariant;

/// Physical heuristics applied when a channel transition is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorModelConfig {
    // --- Pulse tube ---
    /// Temperature drop (K) of mixing chamber and still when the pulse tube starts.
    pub pulsetube_cool_step_k: f64,
    /// Temperature rise (K) of mixing chamber and still when the pulse tube stops.
    pub pulsetube_warm_step_k: f64,
    /// Lowest simulated mixing-chamber temperature (K).
    pub mix_chamber_floor_k: f64,
    /// Lowest simulated still temperature (K).
    pub still_floor_k: f64,
    /// Ambient temperature (K); warm-up never exceeds it.
    pub ambient_k: f64,

    // --- Compressor cooling water ---
    /// Water temperature change (°C) per compressor transition.
    pub water_step_c: f64,
    /// Lowest water temperature (°C) while the compressor runs.
    pub water_floor_c: f64,
    /// Highest water temperature (°C) while the compressor is off.
    pub water_cap_c: f64,

    // --- Vacuum ---
    /// Pressures divide by this factor when a pump starts and multiply
    /// by it when a pump stops.
    pub pressure_factor: f64,
}

impl Default for SensorModelConfig {
    fn default() -> Self {
        Self {
            pulsetube_cool_step_k: 50.0,
            pulsetube_warm_step_k: 10.0,
            mix_chamber_floor_k: 0.1,
            still_floor_k: 1.0,
            ambient_k: 300.0,

            water_step_c: 1.0,
            water_floor_c: 15.0,
            water_cap_c: 25.0,

            pressure_factor: 10.0,
        }
    }
}

/// Core simulator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // --- Fleet ---
    /// Identifiers of the simulated fridges.
    pub fridge_ids: Vec<String>,
    /// Poll interval (milliseconds).
    pub poll_interval_ms: u64,

    // --- Mirroring ---
    /// Root directory for per-day CSV mirrors.  `None` keeps history in memory only.
    pub mirror_dir: Option<PathBuf>,

    // --- Initial readings ---
    /// Starting temperature (K) of mixing chamber, still and plate.
    pub initial_temperature_k: f64,
    /// Starting compressor water temperature (°C), inlet and outlet.
    pub initial_water_c: f64,
    /// Starting reading (mbar) of every vacuum gauge.
    pub initial_pressure_mbar: f64,
    /// Which sensor spelling the simulated compressor reports.
    pub water_sensor_variant: WaterSensorVariant,

    // --- Heuristics ---
    pub model: SensorModelConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            // Fleet
            fridge_ids: vec!["fridge_1".into(), "fridge_2".into()],
            poll_interval_ms: 10_000,

            // Mirroring
            mirror_dir: None,

            // Initial readings
            initial_temperature_k: 300.0,
            initial_water_c: 20.0,
            initial_pressure_mbar: 1.0e-3,
            water_sensor_variant: WaterSensorVariant::Standard,

            model: SensorModelConfig::default(),
        }
    }
}

impl SimConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fridge_ids.is_empty() {
            return Err(ConfigError::ValidationFailed("fridge_ids must not be empty"));
        }
        if self.fridge_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed("fridge ids must not be blank"));
        }
        let mut ids: Vec<&str> = self.fridge_ids.iter().map(String::as_str).collect();
        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            return Err(ConfigError::ValidationFailed("fridge ids must be unique"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("poll_interval_ms must be > 0"));
        }
        if !(self.initial_pressure_mbar.is_finite() && self.initial_pressure_mbar >= 0.0) {
            return Err(ConfigError::ValidationFailed(
                "initial_pressure_mbar must be finite and >= 0",
            ));
        }

        let m = &self.model;
        if !(m.pressure_factor.is_finite() && m.pressure_factor > 1.0) {
            return Err(ConfigError::ValidationFailed("pressure_factor must be > 1"));
        }
        if m.pulsetube_cool_step_k < 0.0 || m.pulsetube_warm_step_k < 0.0 || m.water_step_c < 0.0 {
            return Err(ConfigError::ValidationFailed("step sizes must be >= 0"));
        }
        if m.mix_chamber_floor_k > m.ambient_k || m.still_floor_k > m.ambient_k {
            return Err(ConfigError::ValidationFailed(
                "temperature floors must not exceed ambient_k",
            ));
        }
        if m.water_floor_c > m.water_cap_c {
            return Err(ConfigError::ValidationFailed(
                "water_floor_c must not exceed water_cap_c",
            ));
        }
        if self.initial_temperature_k > m.ambient_k {
            return Err(ConfigError::ValidationFailed(
                "initial_temperature_k must not exceed ambient_k",
            ));
        }
        Ok(())
    }
}
