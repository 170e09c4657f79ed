//! # Squad Tracker
//!
//! A local CS2 squad performance tracker backed by the FACEIT Data API.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (identity, match records, performance)
//! - **cache**: In-memory TTL cache for upstream lookups
//! - **client**: Authenticated upstream API client with read-through caching
//! - **aggregate**: History/detail join and loose-JSON normalization
//! - **calculate**: Aggregate metrics and impact-score computation
//! - **storage**: JSONL roster persistence
//! - **service**: Player and ranking operations
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod aggregate;
pub mod api;
pub mod cache;
pub mod calculate;
pub mod client;
pub mod config;
pub mod models;
pub mod service;
pub mod storage;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "6h", "30m", "90s").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    Some(Duration::from_secs(num * multiplier))
}
