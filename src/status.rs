//! Human-oriented status summary.
//!
//! ```text
//! **System Status**: ⚪️scr1 ⚪️scr2 ⚪️tur1 ⚪️comp 🟡pt
//! **Temperatures**: MC: 250.00 K | Still: 250.00 K | Plate: 300.00 K
//! **Compressor Water**: Water In/Out: 20.0 °C / 20.0 °C
//! **Vacuum**: Lowest vacuum: 1.00·10⁻³ mbar
//! ```
//!
//! Rendering is stateless.  The two implied-transitional rules (turbo
//! speed mismatch, pulse tube without compressor) are recomputed on every
//! call and never written back to the store.

use crate::channels::{Channel, ChannelValue};
use crate::history::{StateSnapshot, StatusSnapshot};
use crate::sensors::{GAUGE_COUNT, SensorKey, SensorReadings, WaterSensorVariant};

/// Components shown on the status line, with their fixed-width labels.
const MAIN_COMPONENTS: [(Channel, &str); 5] = [
    (Channel::Scroll1, "scr1"),
    (Channel::Scroll2, "scr2"),
    (Channel::Turbo1, "tur1"),
    (Channel::Compressor, "comp"),
    (Channel::PulseTube, "pt  "),
];

pub const fn glyph(value: ChannelValue) -> &'static str {
    match value {
        ChannelValue::Off => "⚪️",
        ChannelValue::On => "🟢",
        ChannelValue::Transitional => "🟡",
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatusFormatter;

impl StatusFormatter {
    /// Value shown for `channel`, after the implied-transitional rules.
    pub fn display_value(
        channel: Channel,
        state: &StateSnapshot,
        readings: Option<&SensorReadings>,
    ) -> ChannelValue {
        let stored = state.get(channel);
        match channel {
            Channel::Turbo1 => {
                let on = stored == ChannelValue::On;
                let at_speed = readings.is_some_and(SensorReadings::turbo_at_speed);
                if on ^ at_speed {
                    ChannelValue::Transitional
                } else {
                    stored
                }
            }
            Channel::PulseTube
                if stored == ChannelValue::On
                    && state.get(Channel::Compressor) != ChannelValue::On =>
            {
                ChannelValue::Transitional
            }
            _ => stored,
        }
    }

    /// Multi-line summary.  Lines whose source data is missing are left
    /// out; the system-status line is always present.
    pub fn render(
        state: &StateSnapshot,
        status: Option<&StatusSnapshot>,
        pressures: Option<&[f64; GAUGE_COUNT]>,
    ) -> String {
        let readings = status.map(|s| &s.readings);
        let mut lines = vec![format!(
            "**System Status**: {}",
            Self::component_line(state, readings)
        )];

        if let Some(temps) = readings.and_then(Self::temperature_line) {
            lines.push(format!("**Temperatures**: {temps}"));
        }
        if let Some(water) = readings.and_then(Self::water_line) {
            lines.push(format!("**Compressor Water**: {water}"));
        }
        if let Some(p) = pressures {
            let lowest = p.iter().copied().fold(f64::INFINITY, f64::min);
            lines.push(format!(
                "**Vacuum**: Lowest vacuum: {} mbar",
                format_unicode_sci(lowest)
            ));
        }
        lines.join("\n")
    }

    fn component_line(state: &StateSnapshot, readings: Option<&SensorReadings>) -> String {
        MAIN_COMPONENTS
            .iter()
            .map(|&(channel, label)| {
                let value = Self::display_value(channel, state, readings);
                format!("{}{label}", glyph(value))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn temperature_line(readings: &SensorReadings) -> Option<String> {
        let parts: Vec<String> = [
            (SensorKey::MixChamber, "MC"),
            (SensorKey::Still, "Still"),
            (SensorKey::Platform, "Plate"),
        ]
        .into_iter()
        .filter_map(|(key, label)| readings.get(key).map(|k| format!("{label}: {k:.2} K")))
        .collect();
        (!parts.is_empty()).then(|| parts.join(" | "))
    }

    fn water_line(readings: &SensorReadings) -> Option<String> {
        let (in_key, out_key) = WaterSensorVariant::detect(readings)?.keys();
        let wi = readings.get(in_key).unwrap_or(0.0);
        let wo = readings.get(out_key).unwrap_or(0.0);
        Some(format!("Water In/Out: {wi:.1} °C / {wo:.1} °C"))
    }
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

fn superscript(c: char) -> char {
    match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '-' => '⁻',
        other => other,
    }
}

/// `1.20·10⁻⁴` outside the `10⁻¹ ..< 10⁴` decade range, `1.200` inside it,
/// `0` for zero.
pub fn format_unicode_sci(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    if !x.is_finite() {
        return x.to_string();
    }
    let exp = x.abs().log10().floor() as i32;
    if (-1..=3).contains(&exp) {
        return format!("{x:.3}");
    }
    // Mantissa and exponent from `{:e}`; dividing by a power of ten
    // underflows for subnormals.
    let sci = format!("{x:.2e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let sup: String = exp.chars().map(superscript).collect();
    format!("{mantissa}·10{sup}")
}
