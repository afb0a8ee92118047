//! SQLite-backed cache store partitioned by generation.
//!
//! This module provides the persistent key-value store behind the cache
//! manager, with async access via tokio-rusqlite. It supports:
//!
//! - Entries keyed by (generation label, resource key)
//! - Atomic upsert per key
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Whole-generation deletion for reclaiming space on activation

pub mod connection;
pub mod entries;
pub mod key;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::ResponseSnapshot;
pub use key::resource_key;
