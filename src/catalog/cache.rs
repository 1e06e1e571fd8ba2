//! Named catalogs cached for a fixed lifetime.

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
struct CatalogSlot<K, V> {
    entries: HashMap<K, V>,
    populated_at: DateTime<Utc>,
}

/// Cache hosting several named catalogs, each replaced wholesale.
///
/// A catalog is stale when it was never populated, holds no entries, or was
/// populated more than `ttl` ago. There is no per-entry expiry.
#[derive(Debug)]
pub struct TtlCache<K, V, C>
where
    C: Clock + Send + Sync,
{
    ttl: TimeDelta,
    clock: Arc<C>,
    catalogs: RwLock<HashMap<String, CatalogSlot<K, V>>>,
}

impl<K, V, C> TtlCache<K, V, C>
where
    K: Eq + Hash,
    V: Clone,
    C: Clock + Send + Sync,
{
    /// Creates an empty cache whose catalogs live for `ttl`.
    #[must_use]
    pub fn new(ttl: TimeDelta, clock: Arc<C>) -> Self {
        Self {
            ttl,
            clock,
            catalogs: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CatalogSlot<K, V>>> {
        self.catalogs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CatalogSlot<K, V>>> {
        self.catalogs.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` when the named catalog must be reloaded.
    #[must_use]
    pub fn is_stale(&self, name: &str) -> bool {
        let now = self.clock.utc();
        self.read().get(name).is_none_or(|slot| {
            slot.entries.is_empty()
                || slot
                    .populated_at
                    .checked_add_signed(self.ttl)
                    .is_none_or(|expiry| now > expiry)
        })
    }

    /// Returns a copy of the cached value, ignoring staleness.
    #[must_use]
    pub fn get(&self, name: &str, key: &K) -> Option<V> {
        self.read()
            .get(name)
            .and_then(|slot| slot.entries.get(key))
            .cloned()
    }

    /// Replaces the named catalog with `items`, keyed by `key_fn`.
    ///
    /// Items for which `key_fn` returns `None` are skipped. Returns the
    /// number of cached entries.
    pub fn populate<I, F>(&self, name: &str, items: I, key_fn: F) -> usize
    where
        I: IntoIterator<Item = V>,
        F: Fn(&V) -> Option<K>,
    {
        let entries: HashMap<K, V> = items
            .into_iter()
            .filter_map(|item| key_fn(&item).map(|key| (key, item)))
            .collect();
        let count = entries.len();
        self.write().insert(
            name.to_owned(),
            CatalogSlot {
                entries,
                populated_at: self.clock.utc(),
            },
        );
        count
    }

    /// Returns the number of entries cached under `name`.
    #[must_use]
    pub fn len(&self, name: &str) -> usize {
        self.read().get(name).map_or(0, |slot| slot.entries.len())
    }

    /// Drops the named catalog so the next staleness check reports `true`.
    pub fn invalidate(&self, name: &str) {
        self.write().remove(name);
    }
}
