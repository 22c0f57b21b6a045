//! Write policies.
//!
//! The policy only decides bookkeeping: whether a written block is marked
//! dirty, and when a memory write is charged. Block data is never modelled.

use serde::{Deserialize, Serialize};

/// When written data reaches backing storage.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum WritePolicy {
    /// Writes stay in the cache until the dirty block is evicted.
    #[default]
    WriteBack,
    /// Every write is propagated to memory immediately.
    WriteThrough,
}

impl WritePolicy {
    /// Whether a write leaves the block dirty.
    #[inline]
    pub fn marks_dirty(self) -> bool {
        matches!(self, WritePolicy::WriteBack)
    }

    /// Whether evicting a dirty block streams it out to memory.
    #[inline]
    pub fn writes_back_on_evict(self) -> bool {
        matches!(self, WritePolicy::WriteBack)
    }

    /// Whether each write is charged as a memory write when it happens.
    #[inline]
    pub fn writes_through(self) -> bool {
        matches!(self, WritePolicy::WriteThrough)
    }

    pub fn name(self) -> &'static str {
        match self {
            WritePolicy::WriteBack => "write-back",
            WritePolicy::WriteThrough => "write-through",
        }
    }
}

impl std::fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
