//! Simulator configuration.
//!
//! Configuration is read from TOML with a single `[cache]` table. Every field
//! is optional; an empty file describes the reference cache of 1024 sets,
//! 4 ways and 32-byte blocks (128 KiB), write-back, LRU.
//!
//! ```toml
//! [cache]
//! size_bytes = 32768
//! ways = 2
//! line_bytes = 64
//! write_policy = "write-through"
//! recency = "timestamp"
//!
//! [cache.latency]
//! miss_fill = 100
//! ```
//!
//! The geometry is given either as a total size (`size_bytes`) or as a set
//! count (`sets`). [`CacheConfig::geometry`] validates it once and yields the
//! immutable [`Geometry`] the cache is built from.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::addr::AddressLayout;
use crate::common::error::ConfigError;

pub use crate::cache::policies::RecencyTracking;
pub use crate::cache::write_policy::WritePolicy;

/// Set count used when neither `size_bytes` nor `sets` is given.
pub const DEFAULT_SETS: u64 = 1024;

/// Ways per set unless configured.
pub const DEFAULT_WAYS: u64 = 4;

/// Block size in bytes unless configured.
pub const DEFAULT_LINE_BYTES: u64 = 32;

/// Largest supported associativity.
pub const MAX_ASSOCIATIVITY: u64 = 64;

/// Largest supported `sets * ways`. Every block keeps metadata and recency
/// links resident, so this bounds the allocation at construction.
pub const MAX_BLOCKS: u64 = 1 << 24;

/// Root of a configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub cache: CacheConfig,
}

impl Config {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reads and parses a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }
}

/// Geometry, policies and latencies of the simulated cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Total capacity in bytes. Mutually consistent with `sets` if both are given.
    pub size_bytes: Option<u64>,
    /// Number of sets.
    pub sets: Option<u64>,
    /// Associativity.
    pub ways: u64,
    /// Block size in bytes.
    pub line_bytes: u64,
    pub write_policy: WritePolicy,
    pub recency: RecencyTracking,
    pub latency: LatencyConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            size_bytes: None,
            sets: None,
            ways: DEFAULT_WAYS,
            line_bytes: DEFAULT_LINE_BYTES,
            write_policy: WritePolicy::default(),
            recency: RecencyTracking::default(),
            latency: LatencyConfig::default(),
        }
    }
}

/// Cycle costs charged by the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LatencyConfig {
    /// Cost of any hit.
    pub hit: u64,
    /// Cost of filling a block from memory on a miss.
    pub miss_fill: u64,
    /// Extra cost of writing a dirty victim back before the fill.
    pub writeback: u64,
    /// Cost of one access with no cache at all, for the baseline estimate.
    pub memory_access: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            hit: 1,
            miss_fill: 51,
            writeback: 50,
            memory_access: 50,
        }
    }
}

/// Validated cache shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    sets: usize,
    ways: usize,
    line_bytes: u64,
    layout: AddressLayout,
}

impl Geometry {
    pub fn sets(&self) -> usize {
        self.sets
    }

    pub fn ways(&self) -> usize {
        self.ways
    }

    pub fn line_bytes(&self) -> u64 {
        self.line_bytes
    }

    pub fn layout(&self) -> &AddressLayout {
        &self.layout
    }

    /// Total capacity in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.sets as u64 * self.ways as u64 * self.line_bytes
    }
}

impl CacheConfig {
    /// Configuration for an explicit `sets x ways x line_bytes` cache.
    pub fn with_sets(sets: u64, ways: u64, line_bytes: u64) -> Self {
        Self {
            sets: Some(sets),
            ways,
            line_bytes,
            ..Self::default()
        }
    }

    /// Configuration for a cache of `size_bytes` total capacity.
    pub fn with_size(size_bytes: u64, ways: u64, line_bytes: u64) -> Self {
        Self {
            size_bytes: Some(size_bytes),
            ways,
            line_bytes,
            ..Self::default()
        }
    }

    /// Resolves and checks the geometry.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] geometry variant; see the variant docs for the
    /// exact conditions.
    pub fn geometry(&self) -> Result<Geometry, ConfigError> {
        if self.ways == 0 || self.ways > MAX_ASSOCIATIVITY {
            return Err(ConfigError::AssociativityOutOfRange {
                ways: self.ways,
                max: MAX_ASSOCIATIVITY,
            });
        }
        if self.line_bytes == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if !self.line_bytes.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                what: "block size",
                value: self.line_bytes,
            });
        }

        let sets = match (self.size_bytes, self.sets) {
            (Some(size_bytes), sets) => {
                let from_size = self.sets_from_size(size_bytes)?;
                match sets {
                    Some(sets) if sets != from_size => {
                        return Err(ConfigError::GeometryMismatch { from_size, sets });
                    }
                    _ => from_size,
                }
            }
            (None, Some(sets)) => sets,
            (None, None) => DEFAULT_SETS,
        };
        if sets == 0 {
            return Err(ConfigError::ZeroSets);
        }
        if !sets.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                what: "set count",
                value: sets,
            });
        }

        let layout = AddressLayout::new(sets.trailing_zeros(), self.line_bytes.trailing_zeros())?;

        let blocks = sets.saturating_mul(self.ways);
        if blocks > MAX_BLOCKS {
            return Err(ConfigError::TooManyBlocks {
                blocks,
                max: MAX_BLOCKS,
            });
        }

        Ok(Geometry {
            sets: sets as usize,
            ways: self.ways as usize,
            line_bytes: self.line_bytes,
            layout,
        })
    }

    fn sets_from_size(&self, size_bytes: u64) -> Result<u64, ConfigError> {
        if size_bytes == 0 {
            return Err(ConfigError::ZeroCacheSize);
        }
        let not_divisible = ConfigError::SizeNotDivisible {
            size_bytes,
            line_bytes: self.line_bytes,
            ways: self.ways,
        };
        match self.line_bytes.checked_mul(self.ways) {
            Some(set_bytes) if size_bytes % set_bytes == 0 => Ok(size_bytes / set_bytes),
            _ => Err(not_divisible),
        }
    }
}
