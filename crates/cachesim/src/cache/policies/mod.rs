//! Replacement policies.
//!
//! Both implementations track true LRU and are observably identical; they
//! differ only in how recency is stored. Before a set is touched its order is
//! ascending by way, so way 0 is the first victim of a cold set.

use serde::{Deserialize, Serialize};

/// Per-set recency bookkeeping used to pick eviction victims.
pub trait ReplacementPolicy {
    /// Marks `way` of `set` as most recently used.
    fn promote(&mut self, set: usize, way: usize);

    /// Returns the least recently used way of `set` without changing the order.
    fn victim(&self, set: usize) -> usize;

    /// Recency rank of `way` within `set`: 0 is most recently used,
    /// `ways - 1` is the current victim.
    fn rank(&self, set: usize, way: usize) -> usize;
}

/// How recency is stored.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum RecencyTracking {
    /// Per-set doubly-linked order over way indices.
    #[default]
    List,
    /// Global access clock stamped on each promoted way.
    Timestamp,
}

/// Builds the policy selected by `tracking` for a `sets x ways` cache.
pub fn build(tracking: RecencyTracking, sets: usize, ways: usize) -> Box<dyn ReplacementPolicy> {
    match tracking {
        RecencyTracking::List => Box::new(LruPolicy::new(sets, ways)),
        RecencyTracking::Timestamp => Box::new(TimestampLruPolicy::new(sets, ways)),
    }
}

pub use self::lru::LruPolicy;
pub use self::timestamp::TimestampLruPolicy;

mod lru;
mod timestamp;
