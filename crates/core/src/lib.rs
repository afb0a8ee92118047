//! Core types and shared functionality for offcache.
//!
//! This crate provides:
//! - Generation-partitioned cache store with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod store;

pub use config::AppConfig;
pub use error::{Error, FetchError};
pub use store::{CacheDb, ResponseSnapshot};
