//! Command dispatch through the poller: routing, parameter checks and
//! all-or-nothing rejection.

use fridgesim::adapters::time::ManualClock;
use fridgesim::app::commands::Params;
use fridgesim::app::poller::Poller;
use fridgesim::app::ports::NoMirror;
use fridgesim::channels::{Channel, ChannelValue};
use fridgesim::config::SimConfig;
use fridgesim::error::{DispatchError, Error};
use serde_json::{Value, json};

use super::mock_ports::{RecordingSink, stepping_clock};

fn fleet() -> Poller<ManualClock> {
    Poller::from_config(&SimConfig::default(), stepping_clock(), |_| NoMirror)
}

fn params(v: Value) -> Params {
    v.as_object().cloned().unwrap_or_default()
}

fn history_len(p: &Poller<ManualClock>, id: &str) -> usize {
    p.fridge(id).unwrap().store().history().len()
}

fn value(p: &Poller<ManualClock>, id: &str, c: Channel) -> ChannelValue {
    p.fridge(id).unwrap().store().value(c)
}

#[test]
fn every_command_in_the_vocabulary_routes() {
    let mut p = fleet();
    let mut sink = RecordingSink::new();
    let steps = [
        ("toggle_compressor", json!({})),
        ("toggle_pulsetube", json!({})),
        ("toggle_turbo", json!({})),
        ("toggle_valve", json!({"valve_name": "v5"})),
        ("toggle_heat_switch", json!({"heat_switch_name": "hs-mc"})),
        ("set_channel", json!({"channel": "ext", "value": 2})),
        ("set_channels", json!({"channels": {"v6": "1", "v7": 1}})),
    ];
    for (name, args) in steps {
        p.execute_command("fridge_1", name, &params(args), &mut sink)
            .unwrap_or_else(|e| panic!("{name}: {e}"));
    }

    for c in [
        Channel::Compressor,
        Channel::PulseTube,
        Channel::Turbo1,
        Channel::V5,
        Channel::HsMc,
        Channel::V6,
        Channel::V7,
    ] {
        assert_eq!(value(&p, "fridge_1", c), ChannelValue::On, "{c}");
    }
    assert_eq!(value(&p, "fridge_1", Channel::Ext), ChannelValue::Transitional);
    assert_eq!(history_len(&p, "fridge_1"), 8);
    assert_eq!(history_len(&p, "fridge_2"), 1);
    assert_eq!(sink.executed_count(), 7);
    assert_eq!(sink.changes().len(), 8);
    assert!(sink.changes().iter().all(|(id, _, _)| id == "fridge_1"));
}

#[test]
fn command_names_are_normalised() {
    let mut p = fleet();
    let mut sink = RecordingSink::new();
    p.execute_command("fridge_2", "  TOGGLE_PULSETUBE ", &Params::new(), &mut sink)
        .unwrap();
    assert_eq!(value(&p, "fridge_2", Channel::PulseTube), ChannelValue::On);
}

#[test]
fn rejections_have_no_side_effects() {
    let mut p = fleet();
    let mut sink = RecordingSink::new();

    let cases = [
        ("fridge_9", "toggle_turbo", json!({}), DispatchError::UnknownFridge),
        ("fridge_1", "self_destruct", json!({}), DispatchError::UnknownCommand),
        (
            "fridge_1",
            "toggle_valve",
            json!({}),
            DispatchError::MissingParam("valve_name"),
        ),
        (
            "fridge_1",
            "set_channel",
            json!({"channel": "v5", "value": ""}),
            DispatchError::MissingParam("value"),
        ),
        (
            "fridge_1",
            "toggle_valve",
            json!({"valve_name": "hs-still"}),
            DispatchError::Rejected(Error::UnknownChannel),
        ),
        (
            "fridge_1",
            "toggle_heat_switch",
            json!({"heat_switch_name": "v5"}),
            DispatchError::Rejected(Error::UnknownChannel),
        ),
        (
            "fridge_1",
            "set_channel",
            json!({"channel": "pulsetube", "value": 1.0}),
            DispatchError::Rejected(Error::InvalidValue),
        ),
        (
            "fridge_1",
            "set_channel",
            json!({"channel": "pulsetube", "value": "on"}),
            DispatchError::Rejected(Error::InvalidValue),
        ),
        (
            "fridge_1",
            "set_channel",
            json!({"channel": "v8", "value": 1}),
            DispatchError::Rejected(Error::UnknownChannel),
        ),
        (
            "fridge_1",
            "set_channels",
            json!({"channels": {"v5": 1, "v6": 5}}),
            DispatchError::Rejected(Error::InvalidValue),
        ),
    ];
    for (id, name, args, expected) in cases {
        assert_eq!(
            p.execute_command(id, name, &params(args), &mut sink),
            Err(expected),
            "{name}"
        );
    }

    assert!(sink.events.is_empty());
    assert_eq!(history_len(&p, "fridge_1"), 1);
    assert_eq!(value(&p, "fridge_1", Channel::V5), ChannelValue::Off);
}

#[test]
fn rejected_command_leaves_fridge_usable() {
    let mut p = fleet();
    let mut sink = RecordingSink::new();
    let bad = params(json!({"channel": "compressor", "value": 7}));
    assert!(p.execute_command("fridge_1", "set_channel", &bad, &mut sink).is_err());

    let good = params(json!({"channel": "compressor", "value": "1"}));
    p.execute_command("fridge_1", "set_channel", &good, &mut sink)
        .unwrap();
    assert_eq!(value(&p, "fridge_1", Channel::Compressor), ChannelValue::On);
    assert_eq!(history_len(&p, "fridge_1"), 2);
}
