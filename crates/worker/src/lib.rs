//! Worker-side logic for offcache.
//!
//! This crate provides the network fetch capability behind a swappable
//! trait and the cache manager that implements install, activate, and
//! per-request dispatch.

pub mod fetch;
pub mod manager;

pub use fetch::{Fetch, FetchConfig, FetchResponse, HttpFetcher};
pub use manager::{CacheManager, Request, RequestKind};
