//! Application layer: wiring configuration into a ready tracker.

pub mod bootstrap;

pub use bootstrap::{open_backend, open_tracker, start_from_env};
