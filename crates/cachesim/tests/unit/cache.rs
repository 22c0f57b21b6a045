//! Access state machine tests.

use cachesim::cache::block::CacheSet;
use cachesim::cache::{AccessKind, Cache, Operation};
use cachesim::common::error::InvariantViolation;
use cachesim::config::{CacheConfig, RecencyTracking, WritePolicy};
use cachesim::stats::CacheStats;
use pretty_assertions::assert_eq;
use rstest::rstest;

use Operation::{Read, Write};

fn cache(sets: u64, ways: u64, policy: WritePolicy) -> Cache {
    let config = CacheConfig {
        write_policy: policy,
        ..CacheConfig::with_sets(sets, ways, 32)
    };
    Cache::new(&config).unwrap()
}

#[test]
fn test_cold_cache_is_invalid_and_clean() {
    let c = cache(4, 2, WritePolicy::WriteBack);
    assert_eq!(c.blocks().count(), 8);
    assert!(c.blocks().all(|b| !b.valid && !b.dirty));
    assert_eq!(c.stats(), CacheStats::default());
}

#[test]
fn test_three_reads_in_two_way_set() {
    let mut c = cache(1, 2, WritePolicy::WriteBack);

    let a = c.access(Read, 0x0000_0000);
    assert_eq!(a.kind, AccessKind::ReadMiss);
    assert_eq!((a.way, a.evicted), (0, None));
    assert_eq!(c.stats().evictions, 0);

    let b = c.access(Read, 0x0000_0020);
    assert_eq!(b.kind, AccessKind::ReadMiss);
    assert_eq!((b.way, b.evicted), (1, None));
    assert_eq!(c.stats().evictions, 0);

    let d = c.access(Read, 0x0000_0040);
    assert_eq!(d.kind, AccessKind::ReadMiss);
    // Way 0 held the tag of 0x00000000 and was least recently used.
    assert_eq!((d.way, d.evicted), (0, Some(0)));
    assert_eq!(c.stats().evictions, 1);
}

#[rstest]
fn test_alternating_pair_stays_resident(
    #[values(RecencyTracking::List, RecencyTracking::Timestamp)] recency: RecencyTracking,
) {
    let config = CacheConfig {
        recency,
        ..CacheConfig::with_sets(1, 2, 32)
    };
    let mut c = Cache::new(&config).unwrap();
    let (a, b, x) = (0x000, 0x020, 0x040);

    for addr in [a, b, a, b, a, b] {
        c.access(Read, addr);
    }
    let s = c.stats();
    assert_eq!((s.read_misses, s.read_hits, s.evictions), (2, 4, 0));

    // A was touched before B, so A goes.
    let out = c.access(Read, x);
    assert_eq!(out.evicted, Some(0));
    assert_eq!(c.stats().evictions, 1);
    assert!(c.access(Read, b).is_hit());
    assert!(c.access(Read, a).is_miss());
}

#[test]
fn test_cold_fill_uses_ascending_ways() {
    let mut c = cache(1, 4, WritePolicy::WriteBack);
    for (i, addr) in [0x000u32, 0x100, 0x200, 0x300].into_iter().enumerate() {
        let out = c.access(Read, addr);
        assert!(out.is_miss());
        assert_eq!(out.way, i);
        assert_eq!(out.evicted, None);
    }
    assert_eq!(c.stats().evictions, 0);
    assert!(c.blocks().all(|b| b.valid));
}

#[test]
fn test_same_block_different_offset_hits() {
    let mut c = cache(4, 1, WritePolicy::WriteBack);
    assert!(c.access(Read, 0x1000).is_miss());
    assert!(c.access(Read, 0x101F).is_hit());
    assert!(c.access(Write, 0x1004).is_hit());
}

#[test]
fn test_sets_do_not_interfere() {
    let mut c = cache(2, 1, WritePolicy::WriteBack);
    let first = c.access(Read, 0x00);
    let second = c.access(Read, 0x20);
    assert_eq!((first.set, second.set), (0, 1));
    assert_eq!(c.stats().evictions, 0);

    let third = c.access(Read, 0x40);
    assert_eq!(third.set, 0);
    assert_eq!(third.evicted, Some(0));
    assert!(c.access(Read, 0x20).is_hit());
}

#[test]
fn test_hit_and_miss_cycles() {
    let mut c = cache(1, 1, WritePolicy::WriteBack);
    assert_eq!(c.access(Read, 0x0).cycles, 51);
    assert_eq!(c.access(Read, 0x0).cycles, 1);
    assert_eq!(c.stats().cycles, 52);
}

#[test]
fn test_write_back_hit_marks_dirty() {
    let mut c = cache(1, 2, WritePolicy::WriteBack);
    c.access(Read, 0x0);
    assert!(!c.block_view(0, 0).dirty);

    let out = c.access(Write, 0x0);
    assert_eq!(out.kind, AccessKind::WriteHit);
    assert!(c.block_view(0, 0).dirty);
    assert_eq!(c.stats().writes, 1);
    assert_eq!(c.stats().stream_outs, 0);
}

#[test]
fn test_write_back_miss_installs_dirty() {
    let mut c = cache(1, 2, WritePolicy::WriteBack);
    let out = c.access(Write, 0x40);
    assert_eq!(out.kind, AccessKind::WriteMiss);
    let block = c.block_view(0, out.way);
    assert!(block.valid && block.dirty);
    assert_eq!(block.tag, 2);
}

#[test]
fn test_write_back_dirty_eviction_streams_out() {
    let mut c = cache(1, 1, WritePolicy::WriteBack);
    c.access(Write, 0x00);
    let out = c.access(Read, 0x20);

    assert!(out.stream_out);
    assert_eq!(out.evicted, Some(0));
    assert_eq!(out.cycles, 51 + 50);
    assert!(!c.block_view(0, 0).dirty);

    let s = c.stats();
    assert_eq!(s.stream_outs, 1);
    assert_eq!(s.evictions, 1);
    assert_eq!(s.stream_ins, 2);
    assert_eq!(s.cycles, 51 + 51 + 50);
}

#[test]
fn test_write_back_clean_eviction_does_not_stream_out() {
    let mut c = cache(1, 1, WritePolicy::WriteBack);
    c.access(Read, 0x00);
    let out = c.access(Read, 0x20);
    assert!(!out.stream_out);
    assert_eq!(out.evicted, Some(0));
    assert_eq!(c.stats().stream_outs, 0);
}

#[test]
fn test_write_through_single_write_miss() {
    let mut c = cache(1, 2, WritePolicy::WriteThrough);
    let out = c.access(Write, 0x0);

    assert_eq!(out.kind, AccessKind::WriteMiss);
    let s = c.stats();
    assert_eq!(s.write_misses, 1);
    assert_eq!(s.writes, 1);
    assert!(!c.block_view(0, out.way).dirty);
}

#[test]
fn test_write_through_never_leaves_dirty_blocks() {
    let mut c = cache(2, 2, WritePolicy::WriteThrough);
    for addr in [0x00, 0x20, 0x40, 0x00, 0x60, 0x80] {
        c.access(Write, addr);
    }

    for index in 0..2 {
        let set = c.set(index);
        assert!(set.blocks().iter().all(|b| b.valid && !b.dirty));
    }
    assert_eq!(c.set(0).find(0), Some(0));
    assert_eq!(c.set(0).find(1), None);
    assert_eq!(c.stats().stream_outs, 0);
}

#[test]
fn test_write_through_counts_each_write_once() {
    let mut c = cache(1, 1, WritePolicy::WriteThrough);
    c.access(Write, 0x0);
    assert_eq!(c.stats().writes, 1);
    c.access(Write, 0x0);
    assert_eq!(c.stats().writes, 2);
    c.access(Read, 0x0);
    assert_eq!(c.stats().writes, 2);

    let s = c.stats();
    assert_eq!((s.write_misses, s.write_hits), (1, 1));
    assert!(c.blocks().all(|b| !b.dirty));
}

#[test]
fn test_write_through_never_streams_out() {
    let mut c = cache(1, 1, WritePolicy::WriteThrough);
    c.access(Write, 0x00);
    let out = c.access(Write, 0x20);
    assert_eq!(out.evicted, Some(0));
    assert!(!out.stream_out);
    assert_eq!(out.cycles, 51);
    assert_eq!(c.stats().stream_outs, 0);
}

#[test]
fn test_attempt_counters_match_hits_and_misses() {
    let mut c = cache(2, 2, WritePolicy::WriteBack);
    let trace = [
        (Read, 0x00),
        (Write, 0x00),
        (Read, 0x20),
        (Write, 0x40),
        (Read, 0x80),
        (Read, 0x00),
        (Write, 0xC0),
        (Read, 0x40),
    ];
    for (op, addr) in trace {
        c.access(op, addr);
    }

    let s = c.stats();
    assert_eq!(s.reads, 5);
    assert_eq!(s.writes, 3);
    assert_eq!(s.read_hits + s.read_misses, s.reads);
    assert_eq!(s.write_hits + s.write_misses, s.writes);
    assert_eq!(s.stream_ins, s.misses());
    c.check_invariants().unwrap();
}

#[test]
fn test_cache_new_propagates_config_error() {
    assert!(Cache::new(&CacheConfig::with_sets(3, 2, 32)).is_err());
}

#[test]
fn test_set_detects_duplicate_tags() {
    let mut set = CacheSet::new(4);
    set.check_unique_tags(7).unwrap();

    *set.block_mut(1) = cachesim::cache::block::Block {
        valid: true,
        dirty: false,
        tag: 0x42,
    };
    *set.block_mut(3) = cachesim::cache::block::Block {
        valid: true,
        dirty: true,
        tag: 0x42,
    };
    assert_eq!(
        set.check_unique_tags(7),
        Err(InvariantViolation {
            set: 7,
            tag: 0x42,
            first_way: 1,
            second_way: 3,
        })
    );

    // An invalid block with the same tag is not a live duplicate.
    set.block_mut(3).valid = false;
    set.check_unique_tags(7).unwrap();
    assert_eq!(set.find(0x42), Some(1));
}
