//! Tabular row encoding for mirrored history.
//!
//! One row per snapshot, no header, comma separated, `[date, time, ...]`:
//!
//! ```text
//! Channels.csv   14-03-25,09:00:07,,scroll1,0,scroll2,0,turbo1,0,…,hs-mc,0
//! Status.csv     14-03-25,09:00:07,mix_chamber,250,still,250,…,tc400setspdatt,0
//! maxigauge.csv  14-03-25,09:00:07,1e-3,1e-3,1e-3,1e-3,1e-3,1e-3
//! ```
//!
//! Numbers are written in shortest round-trip form so a reparsed row
//! reconstructs an identical snapshot.  Field values never contain commas.

use chrono::NaiveDateTime;

use crate::channels::{Channel, ChannelStates, ChannelValue};
use crate::error::MirrorError;
use crate::sensors::{GAUGE_COUNT, Pressures, SensorKey, SensorReadings};

use super::{PressureSnapshot, StateSnapshot, StatusSnapshot};

pub const DATE_FORMAT: &str = "%d-%m-%y";
pub const TIME_FORMAT: &str = "%H:%M:%S";

type RowResult<T> = core::result::Result<T, MirrorError>;

/// The three mirrored streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    State,
    Status,
    Pressure,
}

impl Stream {
    pub const ALL: [Stream; 3] = [Self::State, Self::Status, Self::Pressure];

    /// File name used for this stream inside a day directory.
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::State => "Channels.csv",
            Self::Status => "Status.csv",
            Self::Pressure => "maxigauge.csv",
        }
    }
}

/// One entry handed to a [`HistoryWriter`](crate::app::ports::HistoryWriter).
#[derive(Debug, Clone, Copy)]
pub enum HistoryRecord<'a> {
    State(&'a StateSnapshot),
    Status(&'a StatusSnapshot),
    Pressure(&'a PressureSnapshot),
}

impl HistoryRecord<'_> {
    pub fn stream(&self) -> Stream {
        match self {
            Self::State(_) => Stream::State,
            Self::Status(_) => Stream::Status,
            Self::Pressure(_) => Stream::Pressure,
        }
    }

    pub fn at(&self) -> NaiveDateTime {
        match self {
            Self::State(s) => s.at,
            Self::Status(s) => s.at,
            Self::Pressure(p) => p.at,
        }
    }

    /// Day-directory name (`dd-mm-yy`) this record belongs to.
    pub fn day(&self) -> String {
        self.at().format(DATE_FORMAT).to_string()
    }

    pub fn to_fields(&self) -> Vec<String> {
        match self {
            Self::State(s) => encode_state(s),
            Self::Status(s) => encode_status(s),
            Self::Pressure(p) => encode_pressure(p),
        }
    }

    /// Comma-joined row, without a line terminator.
    pub fn to_line(&self) -> String {
        self.to_fields().join(",")
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn stamp(at: NaiveDateTime) -> [String; 2] {
    [
        at.format(DATE_FORMAT).to_string(),
        at.format(TIME_FORMAT).to_string(),
    ]
}

pub fn encode_state(s: &StateSnapshot) -> Vec<String> {
    let mut row = Vec::with_capacity(3 + 2 * Channel::COUNT);
    row.extend(stamp(s.at));
    // Id column, unused.
    row.push(String::new());
    for (channel, value) in s.channels.iter() {
        row.push(channel.name().to_string());
        row.push(value.as_str().to_string());
    }
    row
}

pub fn encode_status(s: &StatusSnapshot) -> Vec<String> {
    let mut row = Vec::with_capacity(2 + 2 * s.readings.len());
    row.extend(stamp(s.at));
    for (key, value) in s.readings.iter() {
        row.push(key.name().to_string());
        row.push(value.to_string());
    }
    row
}

pub fn encode_pressure(p: &PressureSnapshot) -> Vec<String> {
    let mut row = Vec::with_capacity(2 + GAUGE_COUNT);
    row.extend(stamp(p.at));
    row.extend(p.pressures.readings().iter().map(|v| format!("{v:e}")));
    row
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Split a mirrored line into fields.  Trailing CR/LF is ignored.
pub fn split_line(line: &str) -> Vec<&str> {
    line.trim_end_matches(['\r', '\n']).split(',').collect()
}

fn parse_stamp(fields: &[&str]) -> RowResult<NaiveDateTime> {
    let [date, time, ..] = fields else {
        return Err(MirrorError::MalformedRow("missing date/time columns"));
    };
    NaiveDateTime::parse_from_str(
        &format!("{date} {time}"),
        &format!("{DATE_FORMAT} {TIME_FORMAT}"),
    )
    .map_err(|_| MirrorError::MalformedRow("bad timestamp"))
}

fn parse_number(s: &str) -> RowResult<f64> {
    s.parse::<f64>()
        .map_err(|_| MirrorError::MalformedRow("bad number"))
}

/// Channels absent from the row stay `Off`.
pub fn parse_state(fields: &[&str]) -> RowResult<StateSnapshot> {
    let at = parse_stamp(fields)?;
    let Some(pairs) = fields.get(3..) else {
        return Err(MirrorError::MalformedRow("missing id column"));
    };
    if pairs.len() % 2 != 0 {
        return Err(MirrorError::MalformedRow("odd channel/value list"));
    }
    let mut channels = ChannelStates::all_off();
    for pair in pairs.chunks_exact(2) {
        let channel = Channel::from_name(pair[0])
            .ok_or(MirrorError::MalformedRow("unknown channel"))?;
        let value: ChannelValue = pair[1]
            .parse()
            .map_err(|_| MirrorError::MalformedRow("bad channel value"))?;
        channels.set(channel, value);
    }
    Ok(StateSnapshot { at, channels })
}

pub fn parse_status(fields: &[&str]) -> RowResult<StatusSnapshot> {
    let at = parse_stamp(fields)?;
    let pairs = &fields[2..];
    if pairs.len() % 2 != 0 {
        return Err(MirrorError::MalformedRow("odd sensor/value list"));
    }
    let mut readings = SensorReadings::new();
    for pair in pairs.chunks_exact(2) {
        let key = SensorKey::from_name(pair[0])
            .ok_or(MirrorError::MalformedRow("unknown sensor"))?;
        readings.set(key, parse_number(pair[1])?);
    }
    Ok(StatusSnapshot { at, readings })
}

pub fn parse_pressure(fields: &[&str]) -> RowResult<PressureSnapshot> {
    let at = parse_stamp(fields)?;
    let values = &fields[2..];
    if values.len() != GAUGE_COUNT {
        return Err(MirrorError::MalformedRow("expected six gauge readings"));
    }
    let mut readings = [0.0; GAUGE_COUNT];
    for (slot, raw) in readings.iter_mut().zip(values) {
        *slot = parse_number(raw)?;
    }
    Ok(PressureSnapshot {
        at,
        pressures: Pressures::new(readings),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::WaterSensorVariant;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(7, 5, 9)
            .unwrap()
    }

    #[test]
    fn state_row_layout() {
        let mut channels = ChannelStates::all_off();
        channels.set(Channel::HsMc, ChannelValue::Transitional);
        let s = StateSnapshot { at: at(), channels };
        let fields = encode_state(&s);
        assert_eq!(&fields[..5], &["04-03-25", "07:05:09", "", "scroll1", "0"]);
        assert_eq!(fields.len(), 3 + 2 * Channel::COUNT);
        assert_eq!(fields.last().unwrap(), "2");
        assert_eq!(HistoryRecord::State(&s).day(), "04-03-25");
    }

    #[test]
    fn status_row_reparses_identically() {
        let mut readings = SensorReadings::initial(300.0, 20.0, WaterSensorVariant::Alternate);
        readings.set(SensorKey::MixChamber, 0.1);
        readings.set(SensorKey::Still, 1.0 / 3.0);
        let s = StatusSnapshot { at: at(), readings };
        let line = HistoryRecord::Status(&s).to_line();
        let back = parse_status(&split_line(&line)).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn pressure_row_uses_exponent_form() {
        let p = PressureSnapshot {
            at: at(),
            pressures: Pressures::new([1e-3, 2.5e-7, 0.0, 1000.0, 1e-4, 3.0]),
        };
        let fields = encode_pressure(&p);
        assert_eq!(fields[2], "1e-3");
        assert_eq!(fields[4], "0e0");
        let back = parse_pressure(&split_line(&format!("{}\r\n", fields.join(",")))).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn rejects_malformed_rows() {
        assert!(parse_state(&["04-03-25"]).is_err());
        assert!(parse_state(&["04-03-25", "07:05:09"]).is_err());
        assert!(parse_state(&["04-03-25", "07:05:09", "", "v5"]).is_err());
        assert!(parse_state(&["04-03-25", "07:05:09", "", "v8", "1"]).is_err());
        assert!(parse_state(&["04-03-25", "07:05:09", "", "v5", "3"]).is_err());
        assert!(parse_state(&["2025-03-04", "07:05:09", ""]).is_err());
        assert!(parse_status(&["04-03-25", "07:05:09", "still", "warm"]).is_err());
        assert!(parse_pressure(&["04-03-25", "07:05:09", "1e-3"]).is_err());
    }

    #[test]
    fn empty_state_pairs_mean_all_off() {
        let s = parse_state(&["04-03-25", "07:05:09", ""]).unwrap();
        assert_eq!(s.channels, ChannelStates::all_off());
    }
}
