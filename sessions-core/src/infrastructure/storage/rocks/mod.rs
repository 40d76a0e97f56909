//! RocksDB-backed tracker implementation.
//!
//! See `engine.rs` for lock semantics and key layout.

pub mod engine;
pub mod migration;
pub mod schema;
pub mod util;

pub use engine::RocksTracker;
