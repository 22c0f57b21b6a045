//! Performance counters and the end-of-run report.
//!
//! Counters only ever grow. Ratios and the no-cache baseline are derived
//! from a snapshot when asked for and never stored.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cache::write_policy::WritePolicy;
use crate::cache::{AccessOutcome, Cache, Operation};

/// Snapshot of the accumulated counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Attempted reads.
    pub reads: u64,
    pub read_hits: u64,
    pub read_misses: u64,
    /// Attempted writes.
    pub writes: u64,
    pub write_hits: u64,
    pub write_misses: u64,
    /// Block fills from memory.
    pub stream_ins: u64,
    /// Dirty blocks written back to memory.
    pub stream_outs: u64,
    /// Valid blocks replaced on a miss.
    pub evictions: u64,
    pub cycles: u64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.read_hits + self.write_hits
    }

    pub fn misses(&self) -> u64 {
        self.read_misses + self.write_misses
    }

    pub fn accesses(&self) -> u64 {
        self.reads + self.writes
    }

    /// Hits over accesses, 0.0 for an empty run.
    pub fn hit_ratio(&self) -> f64 {
        ratio(self.hits(), self.accesses())
    }

    /// Misses over accesses, 0.0 for an empty run.
    pub fn miss_ratio(&self) -> f64 {
        ratio(self.misses(), self.accesses())
    }

    /// Cycles the same accesses would take if each went straight to memory.
    pub fn cycles_without_cache(&self, memory_access: u64) -> u64 {
        memory_access * self.accesses()
    }

    /// Writes that reached memory: write-backs of dirty victims, or every
    /// write under write-through.
    pub fn memory_writes(&self, policy: WritePolicy) -> u64 {
        if policy.writes_through() {
            self.writes
        } else {
            self.stream_outs
        }
    }
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Accumulates counters from access outcomes. Only the cache writes to it.
#[derive(Debug, Default)]
pub(crate) struct StatsCollector {
    counters: CacheStats,
}

impl StatsCollector {
    pub(crate) fn record(&mut self, outcome: &AccessOutcome) {
        let c = &mut self.counters;
        match (outcome.kind.operation(), outcome.is_hit()) {
            (Operation::Read, true) => c.read_hits += 1,
            (Operation::Read, false) => c.read_misses += 1,
            (Operation::Write, true) => c.write_hits += 1,
            (Operation::Write, false) => c.write_misses += 1,
        }
        match outcome.kind.operation() {
            Operation::Read => c.reads += 1,
            Operation::Write => c.writes += 1,
        }
        if outcome.is_miss() {
            c.stream_ins += 1;
        }
        if outcome.evicted.is_some() {
            c.evictions += 1;
        }
        if outcome.stream_out {
            c.stream_outs += 1;
        }
        c.cycles += outcome.cycles;
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        self.counters
    }
}

/// Cache parameters and statistics of a finished (or paused) run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub cache_size: u64,
    pub block_size: u64,
    pub sets: usize,
    pub associativity: usize,
    pub write_policy: WritePolicy,
    pub stats: CacheStats,
    pub hits: u64,
    pub misses: u64,
    pub accesses: u64,
    /// Percent.
    pub hit_ratio: f64,
    /// Percent.
    pub miss_ratio: f64,
    pub memory_writes: u64,
    pub cycles_without_cache: u64,
}

impl Report {
    pub fn new(cache: &Cache) -> Self {
        let geometry = cache.geometry();
        let stats = cache.stats();
        Self {
            cache_size: geometry.size_bytes(),
            block_size: geometry.line_bytes(),
            sets: geometry.sets(),
            associativity: geometry.ways(),
            write_policy: cache.write_policy(),
            stats,
            hits: stats.hits(),
            misses: stats.misses(),
            accesses: stats.accesses(),
            hit_ratio: stats.hit_ratio() * 100.0,
            miss_ratio: stats.miss_ratio() * 100.0,
            memory_writes: stats.memory_writes(cache.write_policy()),
            cycles_without_cache: stats.cycles_without_cache(cache.latency().memory_access),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.stats;

        writeln!(f, "\nCache parameters:\n")?;
        writeln!(f, "\tCache size: {}", self.cache_size)?;
        writeln!(f, "\tCache block size: {}", self.block_size)?;
        writeln!(f, "\tCache number of sets: {}", self.sets)?;
        writeln!(f, "\tCache associativity: {}", self.associativity)?;
        writeln!(f, "\tWrite policy: {}", self.write_policy)?;

        writeln!(f, "\nCache performance:\n")?;
        writeln!(f, "\tAttempted reads: {}", s.reads)?;
        writeln!(f, "\tCache read hits: {}", s.read_hits)?;
        writeln!(f, "\tCache read misses: {}\n", s.read_misses)?;

        writeln!(f, "\tAttempted writes: {}", s.writes)?;
        writeln!(f, "\tCache write hits: {}", s.write_hits)?;
        writeln!(f, "\tCache write misses: {}\n", s.write_misses)?;

        writeln!(f, "\tCache hits: {}", self.hits)?;
        writeln!(f, "\tCache misses: {}", self.misses)?;
        writeln!(f, "\tTotal accesses: {}\n", self.accesses)?;

        writeln!(f, "\tCache hit ratio: {:.2}%", self.hit_ratio)?;
        writeln!(f, "\tCache miss ratio: {:.2}%\n", self.miss_ratio)?;

        writeln!(f, "\tStream-in operations: {}", s.stream_ins)?;
        writeln!(f, "\tCache evictions: {}", s.evictions)?;
        writeln!(f, "\tStream-out operations: {}", s.stream_outs)?;
        writeln!(f, "\tMemory writes: {}\n", self.memory_writes)?;

        writeln!(f, "\tCycles with cache: {}", s.cycles)?;
        writeln!(f, "\tCycles without cache: {}", self.cycles_without_cache)
    }
}
