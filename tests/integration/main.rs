//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  Nothing here needs a real clock; file-mirror
//! tests write under a temporary directory.

mod dispatch_tests;
mod mirror_tests;
mod mock_ports;
