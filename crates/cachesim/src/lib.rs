//! Trace-driven simulator of a single-level, set-associative, blocking cache.
//!
//! The engine lives in [`cache`]: address decomposition, per-set block
//! metadata, LRU replacement, write-back / write-through bookkeeping and the
//! performance counters. Everything around it ([`sim`] for trace replay,
//! [`stats::Report`] and [`cache::Dump`] for rendering, [`config`] for
//! geometry selection) only feeds the engine `(operation, address)` pairs or
//! reads it back.
//!
//! ```
//! use cachesim::cache::{AccessKind, Cache, Operation};
//! use cachesim::config::CacheConfig;
//!
//! let config = CacheConfig {
//!     sets: Some(1),
//!     ways: 2,
//!     ..CacheConfig::default()
//! };
//! let mut cache = Cache::new(&config).unwrap();
//!
//! assert_eq!(cache.access(Operation::Read, 0x00).kind, AccessKind::ReadMiss);
//! assert_eq!(cache.access(Operation::Read, 0x04).kind, AccessKind::ReadHit);
//! assert_eq!(cache.stats().read_hits, 1);
//! ```

pub mod cache;
pub mod common;
pub mod config;
pub mod sim;
pub mod stats;

pub use crate::cache::{AccessKind, AccessOutcome, Cache, Operation};
pub use crate::common::error::{ConfigError, InvariantViolation, SimError, TraceError};
pub use crate::config::{CacheConfig, Config};
pub use crate::stats::{CacheStats, Report};
