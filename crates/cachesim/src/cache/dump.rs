//! Read-only walk over the cache contents for diagnostics.

use std::fmt;

use super::Cache;

/// Snapshot of one block together with its recency rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockView {
    pub set: usize,
    pub way: usize,
    pub valid: bool,
    pub dirty: bool,
    pub tag: u32,
    /// 0 is most recently used; `ways - 1` is the next victim.
    pub rank: usize,
}

/// Displays every block grouped by way, one line per set.
pub struct Dump<'a> {
    cache: &'a Cache,
}

impl<'a> Dump<'a> {
    pub fn new(cache: &'a Cache) -> Self {
        Self { cache }
    }
}

impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let geometry = self.cache.geometry();
        for way in 0..geometry.ways() {
            writeln!(f, "\n******** Way # {way} ********\n")?;
            for set in 0..geometry.sets() {
                let view = self.cache.block_view(set, way);
                write!(
                    f,
                    "\t[{set}]: {{ valid: {}, dirty: {}, rank: {}, tag: ",
                    u8::from(view.valid),
                    u8::from(view.dirty),
                    view.rank,
                )?;
                if view.valid {
                    writeln!(f, "{:#x} }}", view.tag)?;
                } else {
                    writeln!(f, "- }}")?;
                }
            }
        }
        Ok(())
    }
}
