//! Vacuum gauge readings.
//!
//! Six gauges, values in mbar.  Pumps starting improve the vacuum (every
//! positive reading divides by the configured factor); pumps stopping
//! worsen it (every reading multiplies by the same factor).

use serde::{Deserialize, Serialize};

/// Number of vacuum gauges on the gas-handling system.
pub const GAUGE_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pressures([f64; GAUGE_COUNT]);

impl Pressures {
    pub const fn new(readings: [f64; GAUGE_COUNT]) -> Self {
        Self(readings)
    }

    /// Every gauge at the same reading.
    pub const fn uniform(mbar: f64) -> Self {
        Self([mbar; GAUGE_COUNT])
    }

    pub const fn readings(&self) -> [f64; GAUGE_COUNT] {
        self.0
    }

    /// Pump started: positive readings divide by `factor`.  Zero and
    /// negative readings are left alone.
    pub fn improved(self, factor: f64) -> Self {
        Self(self.0.map(|p| if p > 0.0 { p / factor } else { p }))
    }

    /// Pump stopped: every reading multiplies by `factor`.
    pub fn worsened(self, factor: f64) -> Self {
        Self(self.0.map(|p| p * factor))
    }

    /// Best vacuum across all gauges.
    pub fn lowest(&self) -> f64 {
        self.0.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

impl From<[f64; GAUGE_COUNT]> for Pressures {
    fn from(readings: [f64; GAUGE_COUNT]) -> Self {
        Self(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn improve_skips_non_positive() {
        let p = Pressures::new([8.0, 0.0, -2.0, 0.5, 16.0, 4.0]).improved(4.0);
        assert_eq!(p.readings(), [2.0, 0.0, -2.0, 0.125, 4.0, 1.0]);
    }

    #[test]
    fn worsen_multiplies_everything() {
        let p = Pressures::new([8.0, 0.0, -2.0, 0.5, 16.0, 4.0]).worsened(4.0);
        assert_eq!(p.readings(), [32.0, 0.0, -8.0, 2.0, 64.0, 16.0]);
    }

    #[test]
    fn lowest_picks_best_vacuum() {
        let p = Pressures::new([3.0, 1e-6, 2.0, 1e-3, 7.0, 0.5]);
        assert!((p.lowest() - 1e-6).abs() < f64::EPSILON);
    }
}
