//! Tapboard headless host.
//!
//! Replays JSON gesture scripts against a [`tapboard_core::Board`] so the
//! arbitration engine can be driven and inspected without a windowing system.

pub mod replay;

pub use replay::{ReplayError, Script, Step, load_config, replay, snapshot_json};
