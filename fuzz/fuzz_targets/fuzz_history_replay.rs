//! Fuzz target: history rebuild and resume
//!
//! Splits the input into three streams and rebuilds a `History` from
//! them.  Whenever the rebuild succeeds with at least one triple, a store
//! resumed from it must accept further transitions and a classifier
//! seeded on it must report nothing until history grows.
//!
//! cargo fuzz run fuzz_history_replay

#![no_main]

use fridgesim::adapters::time::SystemClock;
use fridgesim::app::ports::NoMirror;
use fridgesim::channels::Channel;
use fridgesim::config::SimConfig;
use fridgesim::events::EventClassifier;
use fridgesim::history::History;
use fridgesim::store::StateStore;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let mut streams = text.split('\u{1e}');
    let (Some(states), Some(statuses), Some(pressures)) =
        (streams.next(), streams.next(), streams.next())
    else {
        return;
    };

    let Ok(history) = History::from_rows(states.lines(), statuses.lines(), pressures.lines())
    else {
        return;
    };
    let mut classifier = EventClassifier::new(&history);
    assert!(classifier.scan_new_events(&history).is_empty());

    let Ok(mut store) =
        StateStore::from_history(&SimConfig::default(), SystemClock, NoMirror, history)
    else {
        return;
    };
    let before = store.history().len();
    store.toggle_channel(Channel::V13);
    assert_eq!(store.history().len(), before + 1);
});
