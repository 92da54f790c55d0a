//! Cache module for provider responses
//!
//! This module provides an in-memory fetch cache that serves time-windowed
//! responses, coalesces concurrent requests for the same key, and supports
//! graceful degradation by returning the last good value when a refresh fails.

mod fetch_cache;

pub use fetch_cache::FetchCache;
