//! Channel identity and channel values.
//!
//! A fridge exposes a fixed, closed set of controllable channels (pumps,
//! compressor, pulse tube, valves, heat switches).  Each one is a tiny
//! three-state machine:
//!
//! ```text
//!        set / toggle
//!   Off ◀────────────▶ On
//!    ▲                  ▲
//!    └── Transitional ──┘   (only via an explicit set to 2)
//! ```
//!
//! Channels are addressed by [`Channel`] internally; string names only
//! appear at the command boundary and in mirrored rows.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Channel identity
// ---------------------------------------------------------------------------

/// Every channel of the cryostat, in the fixed order used for snapshots
/// and mirrored rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Channel {
    #[serde(rename = "scroll1")]
    Scroll1 = 0,
    #[serde(rename = "scroll2")]
    Scroll2 = 1,
    #[serde(rename = "turbo1")]
    Turbo1 = 2,
    #[serde(rename = "compressor")]
    Compressor = 3,
    #[serde(rename = "pulsetube")]
    PulseTube = 4,
    #[serde(rename = "ext")]
    Ext = 5,
    #[serde(rename = "v5")]
    V5 = 6,
    #[serde(rename = "v6")]
    V6 = 7,
    #[serde(rename = "v7")]
    V7 = 8,
    #[serde(rename = "v9")]
    V9 = 9,
    #[serde(rename = "v13")]
    V13 = 10,
    #[serde(rename = "hs-still")]
    HsStill = 11,
    #[serde(rename = "hs-mc")]
    HsMc = 12,
}

/// Broad category of a channel, used by the typed toggle helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Scroll pumps and the turbo pump.
    VacuumPump,
    Compressor,
    PulseTube,
    /// The `ext` line.
    External,
    Valve,
    HeatSwitch,
}

impl Channel {
    /// Total number of channels; sizes every per-channel array.
    pub const COUNT: usize = 13;

    /// All channels in snapshot order.
    pub const ALL: [Channel; Channel::COUNT] = [
        Self::Scroll1,
        Self::Scroll2,
        Self::Turbo1,
        Self::Compressor,
        Self::PulseTube,
        Self::Ext,
        Self::V5,
        Self::V6,
        Self::V7,
        Self::V9,
        Self::V13,
        Self::HsStill,
        Self::HsMc,
    ];

    /// Position of this channel in snapshot order.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Wire name, as used by commands and mirrored rows.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scroll1 => "scroll1",
            Self::Scroll2 => "scroll2",
            Self::Turbo1 => "turbo1",
            Self::Compressor => "compressor",
            Self::PulseTube => "pulsetube",
            Self::Ext => "ext",
            Self::V5 => "v5",
            Self::V6 => "v6",
            Self::V7 => "v7",
            Self::V9 => "v9",
            Self::V13 => "v13",
            Self::HsStill => "hs-still",
            Self::HsMc => "hs-mc",
        }
    }

    /// Look a channel up by its exact wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub const fn kind(self) -> ChannelKind {
        match self {
            Self::Scroll1 | Self::Scroll2 | Self::Turbo1 => ChannelKind::VacuumPump,
            Self::Compressor => ChannelKind::Compressor,
            Self::PulseTube => ChannelKind::PulseTube,
            Self::Ext => ChannelKind::External,
            Self::V5 | Self::V6 | Self::V7 | Self::V9 | Self::V13 => ChannelKind::Valve,
            Self::HsStill | Self::HsMc => ChannelKind::HeatSwitch,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or(Error::UnknownChannel)
    }
}

// ---------------------------------------------------------------------------
// Channel value
// ---------------------------------------------------------------------------

/// The value of a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum ChannelValue {
    #[default]
    Off = 0,
    On = 1,
    /// In-progress or physically inconsistent.
    Transitional = 2,
}

impl ChannelValue {
    /// Numeric code (`0`, `1`, `2`).
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Single-character wire form (`"0"`, `"1"`, `"2"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "0",
            Self::On => "1",
            Self::Transitional => "2",
        }
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Self::Off),
            1 => Ok(Self::On),
            2 => Ok(Self::Transitional),
            _ => Err(Error::InvalidValue),
        }
    }

    /// Binary flip used by the toggle helpers.  `Transitional` counts as
    /// `Off`, so toggling it turns the channel on.
    pub const fn toggled(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off | Self::Transitional => Self::On,
        }
    }
}

impl fmt::Display for ChannelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact string form only: `"1"` parses, `" 1"` and `"1.0"` do not.
impl FromStr for ChannelValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "0" => Ok(Self::Off),
            "1" => Ok(Self::On),
            "2" => Ok(Self::Transitional),
            _ => Err(Error::InvalidValue),
        }
    }
}

impl From<ChannelValue> for u8 {
    fn from(v: ChannelValue) -> Self {
        v.code()
    }
}

impl TryFrom<u8> for ChannelValue {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        Self::from_code(i64::from(code))
    }
}

// ---------------------------------------------------------------------------
// Raw command input
// ---------------------------------------------------------------------------

/// Anything a caller may hand to `set_channel` as a value: the typed
/// value itself, its string form, or its numeric form.
pub trait ChannelInput {
    fn to_channel_value(&self) -> Result<ChannelValue>;
}

impl ChannelInput for ChannelValue {
    fn to_channel_value(&self) -> Result<ChannelValue> {
        Ok(*self)
    }
}

impl ChannelInput for &str {
    fn to_channel_value(&self) -> Result<ChannelValue> {
        self.parse()
    }
}

impl ChannelInput for String {
    fn to_channel_value(&self) -> Result<ChannelValue> {
        self.parse()
    }
}

macro_rules! impl_numeric_input {
    ($($t:ty),*) => {
        $(
            impl ChannelInput for $t {
                fn to_channel_value(&self) -> Result<ChannelValue> {
                    i64::try_from(*self)
                        .map_err(|_| Error::InvalidValue)
                        .and_then(ChannelValue::from_code)
                }
            }
        )*
    };
}

impl_numeric_input!(u8, u16, u32, u64, i8, i16, i32, i64, usize);

/// JSON parameter bags: integer numbers or strings.  Floats, booleans and
/// everything else are invalid.
impl ChannelInput for serde_json::Value {
    fn to_channel_value(&self) -> Result<ChannelValue> {
        match self {
            serde_json::Value::String(s) => s.parse(),
            serde_json::Value::Number(n) => n
                .as_i64()
                .ok_or(Error::InvalidValue)
                .and_then(ChannelValue::from_code),
            _ => Err(Error::InvalidValue),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-channel state array
// ---------------------------------------------------------------------------

/// Channel → new-value pairs that differ between two states, in channel
/// order.  At most one entry per channel.
pub type ChangeSet = heapless::Vec<(Channel, ChannelValue), { Channel::COUNT }>;

/// Value of every channel at one instant, indexed by [`Channel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelStates {
    values: [ChannelValue; Channel::COUNT],
}

impl ChannelStates {
    /// Every channel off.
    pub fn all_off() -> Self {
        Self::default()
    }

    pub fn get(&self, channel: Channel) -> ChannelValue {
        self.values[channel.index()]
    }

    pub fn set(&mut self, channel: Channel, value: ChannelValue) {
        self.values[channel.index()] = value;
    }

    /// `(channel, value)` pairs in snapshot order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, ChannelValue)> + '_ {
        Channel::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    /// Channels whose value in `self` differs from `previous`, paired with
    /// their value in `self`.
    pub fn diff(&self, previous: &ChannelStates) -> ChangeSet {
        let mut changes = ChangeSet::new();
        for (channel, value) in self.iter() {
            if previous.get(channel) != value {
                // Capacity equals the channel count, so this cannot overflow.
                let _ = changes.push((channel, value));
            }
        }
        changes
    }
}
