use super::ReplacementPolicy;

/// LRU by access stamps.
///
/// Every promotion stamps the way with the next value of a clock owned by
/// this policy; the victim is the smallest stamp. Cold ways all carry stamp 0
/// and tie-break to the lowest way index.
pub struct TimestampLruPolicy {
    ways: usize,
    stamps: Vec<u64>,
    clock: u64,
}

impl TimestampLruPolicy {
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            ways,
            stamps: vec![0; sets * ways],
            clock: 0,
        }
    }

    fn set_stamps(&self, set: usize) -> &[u64] {
        let base = set * self.ways;
        &self.stamps[base..base + self.ways]
    }
}

impl ReplacementPolicy for TimestampLruPolicy {
    fn promote(&mut self, set: usize, way: usize) {
        self.clock += 1;
        self.stamps[set * self.ways + way] = self.clock;
    }

    fn victim(&self, set: usize) -> usize {
        // `min_by_key` keeps the first of equal minima, i.e. the lowest way.
        self.set_stamps(set)
            .iter()
            .enumerate()
            .min_by_key(|&(_, &stamp)| stamp)
            .map_or(0, |(way, _)| way)
    }

    fn rank(&self, set: usize, way: usize) -> usize {
        let stamps = self.set_stamps(set);
        let own = stamps[way];
        stamps
            .iter()
            .enumerate()
            .filter(|&(other, &stamp)| stamp > own || (stamp == own && other > way))
            .count()
    }
}
