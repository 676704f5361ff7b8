//! Dummy cryogenic fridge simulator.
//!
//! Simulates the channel state of dilution refrigerators (pumps,
//! compressor, pulse tube, valves, heat switches), derives plausible sensor
//! and pressure readings from every transition, keeps an append-only
//! snapshot history, detects known operational procedures in that history
//! and renders a human-oriented status summary.
//!
//! Everything outside the core (clock, history mirror, event output,
//! config storage) sits behind the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod channels;
pub mod config;
pub mod error;
pub mod events;
pub mod history;
pub mod sensors;
pub mod status;
pub mod store;

pub use channels::{Channel, ChannelValue};
pub use error::{Error, Result};
pub use store::StateStore;
