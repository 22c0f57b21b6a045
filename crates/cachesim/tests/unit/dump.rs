//! Dump tests.

use cachesim::cache::{BlockView, Cache, Operation};
use cachesim::config::CacheConfig;
use pretty_assertions::assert_eq;

fn two_way_cache() -> Cache {
    let mut cache = Cache::new(&CacheConfig::with_sets(2, 2, 32)).unwrap();
    cache.access(Operation::Read, 0x00);
    cache.access(Operation::Write, 0x80);
    cache
}

#[test]
fn test_block_views_are_set_major() {
    let cache = two_way_cache();
    let views: Vec<_> = cache.blocks().collect();
    assert_eq!(views.len(), 4);
    assert_eq!(
        views[0],
        BlockView {
            set: 0,
            way: 0,
            valid: true,
            dirty: false,
            tag: 0,
            rank: 1,
        }
    );
    assert_eq!(
        views[1],
        BlockView {
            set: 0,
            way: 1,
            valid: true,
            dirty: true,
            tag: 2,
            rank: 0,
        }
    );
    assert!(!views[2].valid && !views[3].valid);
    assert_eq!((views[2].set, views[2].way), (1, 0));
}

#[test]
fn test_dump_does_not_mutate() {
    let cache = two_way_cache();
    let before: Vec<_> = cache.blocks().collect();
    let stats = cache.stats();

    let _ = cache.dump().to_string();

    assert_eq!(cache.blocks().collect::<Vec<_>>(), before);
    assert_eq!(cache.stats(), stats);
}

#[test]
fn test_dump_text() {
    let text = two_way_cache().dump().to_string();
    assert!(text.contains("******** Way # 0 ********"));
    assert!(text.contains("******** Way # 1 ********"));
    assert!(text.contains("\t[0]: { valid: 1, dirty: 0, rank: 1, tag: 0x0 }\n"));
    assert!(text.contains("\t[0]: { valid: 1, dirty: 1, rank: 0, tag: 0x2 }\n"));
    assert!(text.contains("\t[1]: { valid: 0, dirty: 0, rank: 1, tag: - }\n"));
    assert!(text.contains("\t[1]: { valid: 0, dirty: 0, rank: 0, tag: - }\n"));
}
