// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-process TTL cache for catalog reads.
//!
//! Entries carry an absolute expiry. Readers take the read lock; writes,
//! invalidation, and the sweeper take the write lock. A generation counter is
//! bumped on every [`TtlCache::clear`] so that a read which started before a
//! write cannot store its (now stale) result afterwards.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Default lifetime of a cached entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default interval between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Cache key for the full university listing.
pub const ALL_UNIVERSITIES_KEY: &str = "universities:all";

/// Cache key for a normalised search query.
#[must_use]
pub fn search_key(normalized_query: &str) -> String {
    format!("universities:search:{normalized_query}")
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// A key → value map with per-entry absolute expiry.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, Entry<V>>>,
    generation: AtomicU64,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
            default_ttl,
        }
    }

    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the value if present and not expired.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone())
    }

    /// Inserts or overwrites `key`, expiring after `ttl`.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key.into(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Stores `value` with the default TTL unless the cache was cleared since
    /// `generation` was observed. Returns whether the value was stored.
    #[must_use]
    pub fn set_if_current(&self, generation: u64, key: impl Into<String>, value: V) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::Acquire) != generation {
            return false;
        }
        entries.insert(
            key.into(),
            Entry {
                value,
                expires_at: Instant::now() + self.default_ttl,
            },
        );
        true
    }

    /// Removes `key`. Returns whether an entry was present.
    #[must_use]
    pub fn delete(&self, key: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key).is_some()
    }

    /// Drops every entry and starts a new generation.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::AcqRel);
        entries.clear();
    }

    /// The current generation, to be passed to [`TtlCache::set_if_current`].
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Removes expired entries and returns how many were dropped.
    #[must_use]
    pub fn sweep(&self) -> usize {
        let now: Instant = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before: usize = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Number of stored entries, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Handle to a running sweeper task.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the sweeper to exit and waits for it.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Err(e) = (&mut self.task).await {
            debug!(error = %e, "Cache sweeper ended abnormally");
        }
    }
}

/// Spawns a task that sweeps `cache` every `interval` until stopped.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_sweeper<V>(cache: Arc<TtlCache<V>>, interval: Duration) -> SweeperHandle
where
    V: Clone + Send + Sync + 'static,
{
    let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
    let task: JoinHandle<()> = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = ticker.tick() => {
                    let removed: usize = cache.sweep();
                    if removed > 0 {
                        debug!(removed, "Swept expired cache entries");
                    }
                }
            }
        }
        info!("Cache sweeper stopped");
    });
    info!(interval_secs = interval.as_secs(), "Cache sweeper started");
    SweeperHandle {
        shutdown: Some(shutdown),
        task,
    }
}
