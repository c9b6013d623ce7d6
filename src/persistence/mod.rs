//! Local persistence
//!
//! Only the latest odds snapshot is kept on disk; analyses live in memory.

pub mod snapshot_cache;

pub use snapshot_cache::SnapshotCache;
