//! History mirroring: file layout, reload, resume and failure isolation.

use std::fs;

use chrono::TimeDelta;
use fridgesim::adapters::file_mirror::FileMirror;
use fridgesim::adapters::memory::MemoryMirror;
use fridgesim::adapters::time::ManualClock;
use fridgesim::app::service::FridgeService;
use fridgesim::channels::{Channel, ChannelValue};
use fridgesim::config::SimConfig;
use fridgesim::error::MirrorError;
use fridgesim::history::Stream;
use fridgesim::sensors::SensorKey;
use fridgesim::store::StateStore;

use super::mock_ports::{FailingWriter, RecordingSink, start_time, stepping_clock};

#[test]
fn mirror_failure_keeps_memory_authoritative() {
    let mut store = StateStore::new(&SimConfig::default(), stepping_clock(), FailingWriter::default());
    store.toggle_pulsetube();
    store.set_channel("v9", 1).unwrap();

    assert_eq!(store.history().len(), 3);
    assert_eq!(store.mirror().attempts, 9);
    assert_eq!(store.value(Channel::V9), ChannelValue::On);
    assert_eq!(
        store.latest_status().unwrap().readings.get(SensorKey::MixChamber),
        Some(250.0)
    );
}

#[test]
fn file_mirror_reload_and_resume() {
    let tmp = tempfile::tempdir().unwrap();
    let config = SimConfig::default();
    let day = start_time().date();

    {
        let mut store = StateStore::new(&config, stepping_clock(), FileMirror::new(tmp.path()));
        store.toggle_compressor();
        store.toggle_pulsetube();
        store.set_channel("scroll1", "1").unwrap();
    }

    let history = FileMirror::new(tmp.path()).load_day(day).unwrap();
    assert_eq!(history.len(), 4);

    let clock = ManualClock::with_step(start_time() + TimeDelta::minutes(5), 1);
    let store =
        StateStore::from_history(&config, clock, FileMirror::new(tmp.path()), history).unwrap();
    assert_eq!(store.value(Channel::Scroll1), ChannelValue::On);
    let p = store.latest_pressures().unwrap();
    assert!(p.iter().all(|v| (v - 1.0e-4).abs() < 1e-12));

    // Old procedures are not announced again after a resume.
    let mut fridge = FridgeService::new("fridge_1", store);
    assert!(fridge.scan_new_events().is_empty());

    let mut sink = RecordingSink::new();
    fridge
        .execute("toggle_pulsetube", &Default::default(), &mut sink)
        .unwrap();
    assert_eq!(fridge.scan_new_events(), vec!["Pulsetube manual stop"]);

    let reloaded = FileMirror::new(tmp.path()).load_day(day).unwrap();
    assert_eq!(reloaded.len(), 5);
    assert_eq!(&reloaded, fridge.store().history());
}

#[test]
fn rows_land_in_the_day_of_their_timestamp() {
    let tmp = tempfile::tempdir().unwrap();
    let late = start_time().date().and_hms_opt(23, 59, 59).unwrap();
    let clock = ManualClock::with_step(late, 1);
    let mut store = StateStore::new(&SimConfig::default(), clock, FileMirror::new(tmp.path()));
    store.toggle_turbo();

    let mirror = store.mirror();
    let days = mirror.days().unwrap();
    assert_eq!(days.len(), 2);
    for day in days {
        let rows = fs::read_to_string(mirror.stream_path(day, Stream::Pressure)).unwrap();
        assert_eq!(rows.lines().count(), 1);
    }
    assert!(mirror.root().join("15-03-25").join("Channels.csv").exists());
}

#[test]
fn mirrored_rows_have_no_header_and_fixed_prefix() {
    let mut store = StateStore::new(&SimConfig::default(), stepping_clock(), MemoryMirror::new());
    store.set_channel("hs-mc", 2).unwrap();

    let mirror = store.mirror();
    let state = &mirror.lines(Stream::State)[1];
    assert!(state.starts_with("14-03-25,09:00:01,,scroll1,0,"));
    assert!(state.ends_with(",hs-mc,2"));

    let status = &mirror.lines(Stream::Status)[0];
    assert!(status.starts_with("14-03-25,09:00:00,mix_chamber,300,still,300,platform,300,"));

    let pressure = &mirror.lines(Stream::Pressure)[0];
    assert_eq!(pressure, "14-03-25,09:00:00,1e-3,1e-3,1e-3,1e-3,1e-3,1e-3");

    assert_eq!(&mirror.replay().unwrap(), store.history());
}

#[test]
fn misaligned_day_starts_fresh() {
    let tmp = tempfile::tempdir().unwrap();
    let config = SimConfig::default();
    let day = start_time().date();
    let mirror = FileMirror::new(tmp.path());

    {
        let mut store = StateStore::new(&config, stepping_clock(), FileMirror::new(tmp.path()));
        store.toggle_compressor();
    }
    // A state row whose status and pressure appends never landed.
    let channels = mirror.stream_path(day, Stream::State);
    let mut text = fs::read_to_string(&channels).unwrap();
    let last = text.lines().last().unwrap().to_string();
    text.push_str(&last);
    text.push('\n');
    fs::write(&channels, text).unwrap();

    let loaded = mirror.load_day(day);
    assert_eq!(
        loaded,
        Err(MirrorError::MalformedRow("streams differ in length"))
    );

    let store = StateStore::resume_or_new(&config, stepping_clock(), mirror, loaded);
    assert_eq!(store.history().len(), 1);
    assert_eq!(store.value(Channel::Compressor), ChannelValue::Off);
}
