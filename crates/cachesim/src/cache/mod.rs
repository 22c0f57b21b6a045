//! Cache simulation engine.
//!
//! [`Cache`] owns every set, the replacement policy and the statistics
//! collector. One call to [`Cache::access`] fully applies one trace record:
//!
//! 1. decode the address into tag and set index,
//! 2. look the tag up in the set,
//! 3. on a hit, charge the hit latency, mark the block dirty for a
//!    write-back write, and promote the way,
//! 4. on a miss, ask the policy for the victim of *this* set, count an
//!    eviction if the victim was valid and a stream-out if it was also dirty
//!    under write-back, install the new tag, and promote the way,
//! 5. record the outcome in the counters.

pub mod block;
pub mod dump;
pub mod policies;
pub mod write_policy;

use std::fmt;

use log::{debug, trace};

use self::block::{Block, CacheSet};
use self::policies::ReplacementPolicy;
use self::write_policy::WritePolicy;
use crate::common::error::{ConfigError, InvariantViolation};
use crate::config::{CacheConfig, Geometry, LatencyConfig};
use crate::stats::{CacheStats, StatsCollector};

pub use self::dump::{BlockView, Dump};

/// Kind of a trace record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Write,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Read => "read",
            Operation::Write => "write",
        })
    }
}

/// Hit/miss classification of one access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    ReadHit,
    ReadMiss,
    WriteHit,
    WriteMiss,
}

impl AccessKind {
    fn new(op: Operation, hit: bool) -> Self {
        match (op, hit) {
            (Operation::Read, true) => AccessKind::ReadHit,
            (Operation::Read, false) => AccessKind::ReadMiss,
            (Operation::Write, true) => AccessKind::WriteHit,
            (Operation::Write, false) => AccessKind::WriteMiss,
        }
    }

    pub fn is_hit(self) -> bool {
        matches!(self, AccessKind::ReadHit | AccessKind::WriteHit)
    }

    pub fn operation(self) -> Operation {
        match self {
            AccessKind::ReadHit | AccessKind::ReadMiss => Operation::Read,
            AccessKind::WriteHit | AccessKind::WriteMiss => Operation::Write,
        }
    }
}

/// What a single access did. Only used to drive the counters and tracing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessOutcome {
    pub kind: AccessKind,
    /// Tag of the accessed address.
    pub tag: u32,
    /// Set the address maps to.
    pub set: usize,
    /// Way that hit, or that was filled on a miss.
    pub way: usize,
    /// Tag of the valid block replaced by this miss.
    pub evicted: Option<u32>,
    /// Whether the replaced block was written back to memory.
    pub stream_out: bool,
    /// Cycles charged for this access.
    pub cycles: u64,
}

impl AccessOutcome {
    pub fn is_hit(&self) -> bool {
        self.kind.is_hit()
    }

    pub fn is_miss(&self) -> bool {
        !self.kind.is_hit()
    }
}

/// A single-level, set-associative, blocking cache.
pub struct Cache {
    geometry: Geometry,
    write_policy: WritePolicy,
    latency: LatencyConfig,
    sets: Vec<CacheSet>,
    policy: Box<dyn ReplacementPolicy>,
    stats: StatsCollector,
}

impl Cache {
    /// Builds a cold cache: every block invalid and clean, every set in
    /// ascending way order.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        let geometry = config.geometry()?;
        let policy = policies::build(config.recency, geometry.sets(), geometry.ways());
        Ok(Self::assemble(geometry, config, policy))
    }

    /// Builds a cache around a caller-supplied replacement policy.
    pub fn with_policy(
        config: &CacheConfig,
        policy: Box<dyn ReplacementPolicy>,
    ) -> Result<Self, ConfigError> {
        let geometry = config.geometry()?;
        Ok(Self::assemble(geometry, config, policy))
    }

    fn assemble(
        geometry: Geometry,
        config: &CacheConfig,
        policy: Box<dyn ReplacementPolicy>,
    ) -> Self {
        debug!(
            "cache: {} bytes, {} sets x {} ways x {} B blocks, {}, tag/index/offset = {}/{}/{}",
            geometry.size_bytes(),
            geometry.sets(),
            geometry.ways(),
            geometry.line_bytes(),
            config.write_policy,
            geometry.layout().tag_bits(),
            geometry.layout().index_bits(),
            geometry.layout().offset_bits(),
        );

        Self {
            sets: (0..geometry.sets())
                .map(|_| CacheSet::new(geometry.ways()))
                .collect(),
            geometry,
            write_policy: config.write_policy,
            latency: config.latency,
            policy,
            stats: StatsCollector::default(),
        }
    }

    /// Simulates one read or write of `addr`.
    pub fn access(&mut self, op: Operation, addr: u32) -> AccessOutcome {
        let layout = *self.geometry.layout();
        let decoded = layout.decode(addr);
        let index = decoded.index;

        if log::log_enabled!(log::Level::Trace) {
            trace!(
                "{op} {addr:#010x} ({addr}) {addr:032b} = {} tag={:#x} index={} offset={}",
                layout.format_binary(addr),
                decoded.tag,
                index,
                decoded.offset,
            );
        }
        debug_assert!(
            self.sets[index].check_unique_tags(index).is_ok(),
            "duplicate live tag in set {index}"
        );

        let outcome = match self.sets[index].find(decoded.tag) {
            Some(way) => self.hit(op, decoded.tag, index, way),
            None => self.miss(op, decoded.tag, index),
        };
        self.stats.record(&outcome);

        match outcome.evicted {
            Some(old) => trace!(
                "  {:?} set {} way {}: evicted tag {old:#x}{}",
                outcome.kind,
                index,
                outcome.way,
                if outcome.stream_out { " (stream-out)" } else { "" },
            ),
            None => trace!("  {:?} set {} way {}", outcome.kind, index, outcome.way),
        }
        outcome
    }

    fn hit(&mut self, op: Operation, tag: u32, set: usize, way: usize) -> AccessOutcome {
        if op == Operation::Write && self.write_policy.marks_dirty() {
            self.sets[set].block_mut(way).dirty = true;
        }
        self.policy.promote(set, way);

        AccessOutcome {
            kind: AccessKind::new(op, true),
            tag,
            set,
            way,
            evicted: None,
            stream_out: false,
            cycles: self.latency.hit,
        }
    }

    fn miss(&mut self, op: Operation, tag: u32, set: usize) -> AccessOutcome {
        // Always asked for the set being filled, never reused from a lookup.
        let way = self.policy.victim(set);
        debug_assert!(way < self.geometry.ways(), "victim way {way} out of range");

        let victim = *self.sets[set].block(way);
        let evicted = victim.valid.then_some(victim.tag);
        let stream_out = victim.valid && victim.dirty && self.write_policy.writes_back_on_evict();

        let mut cycles = self.latency.miss_fill;
        if stream_out {
            cycles += self.latency.writeback;
        }

        *self.sets[set].block_mut(way) = Block {
            valid: true,
            dirty: op == Operation::Write && self.write_policy.marks_dirty(),
            tag,
        };
        self.policy.promote(set, way);

        AccessOutcome {
            kind: AccessKind::new(op, false),
            tag,
            set,
            way,
            evicted,
            stream_out,
            cycles,
        }
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    pub fn latency(&self) -> &LatencyConfig {
        &self.latency
    }

    pub fn set(&self, index: usize) -> &CacheSet {
        &self.sets[index]
    }

    /// Metadata and recency rank of one block.
    pub fn block_view(&self, set: usize, way: usize) -> BlockView {
        let block = self.set(set).block(way);
        BlockView {
            set,
            way,
            valid: block.valid,
            dirty: block.dirty,
            tag: block.tag,
            rank: self.policy.rank(set, way),
        }
    }

    /// Every block, set-major.
    pub fn blocks(&self) -> impl Iterator<Item = BlockView> + '_ {
        let ways = self.geometry.ways();
        (0..self.geometry.sets())
            .flat_map(move |set| (0..ways).map(move |way| (set, way)))
            .map(move |(set, way)| self.block_view(set, way))
    }

    /// Printable walk of all blocks.
    pub fn dump(&self) -> Dump<'_> {
        Dump::new(self)
    }

    /// Verifies that no set holds a live tag twice.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.sets
            .iter()
            .enumerate()
            .try_for_each(|(index, set)| set.check_unique_tags(index))
    }
}
