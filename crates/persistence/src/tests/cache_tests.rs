// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::Arc;
use std::time::Duration;

use nyushi_domain::University;

use crate::tests::{deadline, seed_medical_school};
use crate::{
    ALL_UNIVERSITIES_KEY, CatalogCache, DEFAULT_TTL, Persistence, TtlCache, search_key,
    spawn_sweeper,
};

#[test]
fn test_get_returns_stored_value() {
    let cache: TtlCache<u32> = TtlCache::default();

    cache.set("a", 1, Duration::from_secs(60));

    assert_eq!(cache.get("a"), Some(1));
    assert_eq!(cache.get("b"), None);
    assert_eq!(cache.default_ttl(), DEFAULT_TTL);
}

#[test]
fn test_expired_entry_is_a_miss_until_swept() {
    let cache: TtlCache<u32> = TtlCache::default();
    cache.set("old", 1, Duration::ZERO);
    cache.set("fresh", 2, Duration::from_secs(60));

    assert_eq!(cache.get("old"), None);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.sweep(), 1);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("fresh"), Some(2));
}

#[test]
fn test_delete_and_clear() {
    let cache: TtlCache<u32> = TtlCache::default();
    cache.set("a", 1, Duration::from_secs(60));
    cache.set("b", 2, Duration::from_secs(60));

    assert!(cache.delete("a"));
    assert!(!cache.delete("a"));
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_clear_rejects_values_loaded_before_it() {
    let cache: TtlCache<u32> = TtlCache::default();
    let before: u64 = cache.generation();

    cache.clear();

    assert!(!cache.set_if_current(before, "stale", 1));
    assert_eq!(cache.get("stale"), None);
    assert!(cache.set_if_current(cache.generation(), "fresh", 2));
    assert_eq!(cache.get("fresh"), Some(2));
}

#[test]
fn test_search_keys_are_distinct_from_list_key() {
    assert_ne!(search_key("医学"), ALL_UNIVERSITIES_KEY);
    assert_ne!(search_key("医学"), search_key("医学部"));
}

#[test]
fn test_reads_are_cached_and_writes_invalidate() {
    let cache: Arc<CatalogCache> = Arc::new(TtlCache::default());
    let persistence: Persistence =
        Persistence::new_in_memory_with_cache(Arc::clone(&cache)).unwrap();
    seed_medical_school(&persistence);

    let first: Vec<University> = persistence.find_all(&deadline()).unwrap();
    persistence.search("医学", &deadline()).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(cache.len(), 2);
    assert!(cache.get(ALL_UNIVERSITIES_KEY).is_some());

    persistence
        .create_university(&University::new("新大学"), &deadline())
        .unwrap();

    assert!(cache.is_empty());
    assert_eq!(persistence.find_all(&deadline()).unwrap().len(), 2);
}

#[test]
fn test_failed_write_keeps_cache() {
    let cache: Arc<CatalogCache> = Arc::new(TtlCache::default());
    let persistence: Persistence =
        Persistence::new_in_memory_with_cache(Arc::clone(&cache)).unwrap();
    persistence.find_all(&deadline()).unwrap();

    assert!(
        persistence
            .create_university(&University::new(""), &deadline())
            .is_err()
    );

    assert_eq!(cache.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_sweeper_removes_expired_entries() {
    let cache: Arc<TtlCache<u32>> = Arc::new(TtlCache::default());
    cache.set("gone", 1, Duration::ZERO);
    let sweeper = spawn_sweeper(Arc::clone(&cache), Duration::from_secs(600));

    tokio::time::sleep(Duration::from_secs(601)).await;
    tokio::task::yield_now().await;

    assert!(cache.is_empty());
    sweeper.stop().await;
}
