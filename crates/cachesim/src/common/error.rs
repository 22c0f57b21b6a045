//! Error types.
//!
//! Three failure categories exist, and they never mix:
//! - [`ConfigError`]: the geometry or policy selection is unusable. Raised
//!   once, before any access is simulated.
//! - [`TraceError`]: a trace record could not be decoded. Raised by the trace
//!   reader before the record reaches the cache, so the engine never sees it.
//! - [`InvariantViolation`]: the engine itself is in an impossible state.
//!
//! [`SimError`] is the umbrella returned by the run driver.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Invalid cache geometry or configuration source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `size_bytes` was given as zero.
    #[error("cache size must be greater than 0 bytes")]
    ZeroCacheSize,

    /// `line_bytes` was zero.
    #[error("block size must be greater than 0 bytes")]
    ZeroBlockSize,

    /// The resolved set count was zero.
    #[error("cache must have at least one set")]
    ZeroSets,

    /// A quantity that is decoded from address bits is not a power of two.
    #[error("{what} must be a power of two, got {value}")]
    NotPowerOfTwo {
        /// Which quantity was rejected.
        what: &'static str,
        /// The offending value.
        value: u64,
    },

    /// Associativity is outside `1..=max`.
    #[error("associativity must be between 1 and {max} ways, got {ways}")]
    AssociativityOutOfRange {
        /// Requested number of ways.
        ways: u64,
        /// Largest supported number of ways.
        max: u64,
    },

    /// Cache size does not divide evenly into `line_bytes * ways` sets.
    #[error("cache size {size_bytes} is not a multiple of block size {line_bytes} x {ways} ways")]
    SizeNotDivisible {
        /// Requested cache size.
        size_bytes: u64,
        /// Requested block size.
        line_bytes: u64,
        /// Requested associativity.
        ways: u64,
    },

    /// Both `size_bytes` and `sets` were given and they describe different caches.
    #[error("cache size implies {from_size} sets but {sets} sets were requested")]
    GeometryMismatch {
        /// Set count derived from `size_bytes`.
        from_size: u64,
        /// Explicitly requested set count.
        sets: u64,
    },

    /// Tag, index and offset fields do not add up to the address width.
    #[error(
        "address fields do not fit a {address_bits}-bit address \
         (tag {tag_bits} + index {index_bits} + offset {offset_bits})"
    )]
    AddressWidth {
        /// Tag field width, as far as it could be computed.
        tag_bits: u32,
        /// Index field width.
        index_bits: u32,
        /// Offset field width.
        offset_bits: u32,
        /// Total address width.
        address_bits: u32,
    },

    /// `sets * ways` exceeds what the simulator will allocate.
    #[error("cache of {blocks} blocks exceeds the supported maximum of {max}")]
    TooManyBlocks {
        /// Requested number of blocks.
        blocks: u64,
        /// Largest supported number of blocks.
        max: u64,
    },

    /// The configuration file could not be read.
    #[error("failed to read config {}: {message}", path.display())]
    Unreadable {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error message.
        message: String,
    },

    /// The configuration file is not valid TOML for [`crate::config::Config`].
    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// A malformed trace record. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// The operation token is neither a read nor a write.
    #[error("line {line}: unrecognized operation `{token}`")]
    UnknownOperation {
        /// Trace line number.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// An operation token was the last token on its line.
    #[error("line {line}: missing address after `{op}`")]
    MissingAddress {
        /// Trace line number.
        line: usize,
        /// The operation token without an address.
        op: String,
    },

    /// The address is not hexadecimal or does not fit in 32 bits.
    #[error("line {line}: malformed address `{token}`")]
    BadAddress {
        /// Trace line number.
        line: usize,
        /// The offending token.
        token: String,
    },
}

/// More than one valid block of a set holds the same tag.
///
/// Signals a bug in the engine, never bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("set {set} holds tag {tag:#x} in more than one valid way ({first_way} and {second_way})")]
pub struct InvariantViolation {
    /// Index of the corrupted set.
    pub set: usize,
    /// The duplicated tag.
    pub tag: u32,
    /// Lowest way holding the tag.
    pub first_way: usize,
    /// Next way holding the same tag.
    pub second_way: usize,
}

/// Errors surfaced by a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Cache could not be constructed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Trace input was rejected.
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// Engine state check failed.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    /// Trace file could not be opened or read.
    #[error("failed to read trace {}: {source}", path.display())]
    Io {
        /// Path of the trace file, or `<input>` for anonymous readers.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl SimError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SimError::Io {
            path: path.into(),
            source,
        }
    }
}
