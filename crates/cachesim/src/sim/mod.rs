//! Trace replay.
//!
//! Records are applied strictly in order, one at a time; the first bad
//! record stops the run and leaves the cache exactly as the previous record
//! left it.

pub mod trace;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, warn};

use self::trace::TraceReader;
use crate::cache::Cache;
use crate::common::error::SimError;

/// Amount of input a run consumed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub records: u64,
    pub lines: usize,
}

/// Feeds every record from `input` to `cache`.
pub fn run<R: BufRead>(cache: &mut Cache, input: R) -> Result<RunSummary, SimError> {
    let mut reader = TraceReader::new(input);
    let mut records = 0u64;

    for record in reader.by_ref() {
        let record = record?;
        cache.access(record.op, record.addr);
        records += 1;
    }

    let summary = RunSummary {
        records,
        lines: reader.lines_read(),
    };
    if records == 0 {
        warn!("trace contained no accesses ({} lines)", summary.lines);
    } else {
        debug!("replayed {} accesses from {} lines", records, summary.lines);
    }
    Ok(summary)
}

/// Replays the trace file at `path`.
pub fn run_file(cache: &mut Cache, path: impl AsRef<Path>) -> Result<RunSummary, SimError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SimError::io(path, e))?;
    run(cache, BufReader::new(file)).map_err(|e| match e {
        SimError::Io { source, .. } => SimError::io(path, source),
        other => other,
    })
}
