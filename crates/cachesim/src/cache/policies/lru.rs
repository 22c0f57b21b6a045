use super::ReplacementPolicy;

const NIL: usize = usize::MAX;

/// LRU as an intrusive doubly-linked list per set.
///
/// Links are way numbers stored in flat `sets * ways` arrays, so promoting
/// is a constant-time unlink and append with no allocation.
pub struct LruPolicy {
    ways: usize,
    prev: Vec<usize>,
    next: Vec<usize>,
    /// Least recently used way of each set.
    head: Vec<usize>,
    /// Most recently used way of each set.
    tail: Vec<usize>,
}

impl LruPolicy {
    pub fn new(sets: usize, ways: usize) -> Self {
        let mut prev = Vec::with_capacity(sets * ways);
        let mut next = Vec::with_capacity(sets * ways);
        for _ in 0..sets {
            for way in 0..ways {
                prev.push(if way == 0 { NIL } else { way - 1 });
                next.push(if way + 1 == ways { NIL } else { way + 1 });
            }
        }

        Self {
            ways,
            prev,
            next,
            head: vec![0; sets],
            tail: vec![ways - 1; sets],
        }
    }

    #[inline(always)]
    fn slot(&self, set: usize, way: usize) -> usize {
        set * self.ways + way
    }
}

impl ReplacementPolicy for LruPolicy {
    fn promote(&mut self, set: usize, way: usize) {
        let tail = self.tail[set];
        if tail == way {
            return;
        }

        // Unlink. `way` is not the tail, so it always has a successor.
        let idx = self.slot(set, way);
        let (before, after) = (self.prev[idx], self.next[idx]);
        if before == NIL {
            self.head[set] = after;
        } else {
            let before_idx = self.slot(set, before);
            self.next[before_idx] = after;
        }
        let after_idx = self.slot(set, after);
        self.prev[after_idx] = before;

        // Append after the current tail.
        let tail_idx = self.slot(set, tail);
        self.next[tail_idx] = way;
        self.prev[idx] = tail;
        self.next[idx] = NIL;
        self.tail[set] = way;
    }

    fn victim(&self, set: usize) -> usize {
        self.head[set]
    }

    fn rank(&self, set: usize, way: usize) -> usize {
        let mut rank = 0;
        let mut cur = self.tail[set];
        while cur != way && cur != NIL {
            rank += 1;
            cur = self.prev[self.slot(set, cur)];
        }
        rank
    }
}
