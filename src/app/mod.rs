//! Application core: simulator domain logic behind port traits.
//!
//! Per-fridge command handling lives in [`service`], fleet routing and the
//! periodic poll cycle in [`poller`].  All interaction with the outside
//! world (clock, history mirror, event output, config storage) happens
//! through the **port traits** defined in [`ports`], keeping this layer
//! fully testable without a filesystem or wall clock.

pub mod commands;
pub mod events;
pub mod poller;
pub mod ports;
pub mod service;
