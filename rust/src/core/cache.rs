//! Process-wide cache for the handful of entities every screen keeps asking
//! for. Reads are stale-or-fetch: a cached value is returned as-is, and a
//! caller that cares about freshness forces a reload. Mutating operations
//! invalidate (or patch) the affected slot.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use deso_api::models::{ExchangeRate, User};
use parking_lot::Mutex;

pub(crate) struct CachedSlot<T: Clone> {
    value: Mutex<Option<T>>,
}

impl<T: Clone> CachedSlot<T> {
    fn new() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }

    pub fn peek(&self) -> Option<T> {
        self.value.lock().clone()
    }

    pub fn set(&self, value: T) {
        *self.value.lock() = Some(value);
    }

    pub fn invalidate(&self) {
        *self.value.lock() = None;
    }

    /// Edit the cached value in place, if there is one.
    pub fn mutate(&self, f: impl FnOnce(&mut T)) {
        if let Some(value) = self.value.lock().as_mut() {
            f(value);
        }
    }

    /// Cached value if present, otherwise fetch and remember.
    pub async fn get_or_fetch<F, Fut, E>(&self, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.peek() {
            return Ok(value);
        }
        let value = fetch().await?;
        self.set(value.clone());
        Ok(value)
    }

    /// Always fetch; replace the cached value on success.
    pub async fn reload<F, Fut, E>(&self, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let value = fetch().await?;
        self.set(value.clone());
        Ok(value)
    }
}

/// The cached entities, shared between the actor and its spawned tasks.
pub(crate) struct CacheRegistry {
    /// The logged-in user: profile, balance, blocked keys, coins held.
    pub user: CachedSlot<User>,
    pub exchange_rate: CachedSlot<ExchangeRate>,
    /// Membership set of saved post hashes (the ordered list lives with the
    /// saved-posts loader).
    pub saved_post_ids: CachedSlot<HashSet<String>>,
}

impl CacheRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            user: CachedSlot::new(),
            exchange_rate: CachedSlot::new(),
            saved_post_ids: CachedSlot::new(),
        })
    }

    /// Drop everything (logout).
    pub fn clear(&self) {
        self.user.invalidate();
        self.exchange_rate.invalidate();
        self.saved_post_ids.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn counted_fetch(counter: &AtomicUsize, value: u32) -> Result<u32, ()> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test]
    async fn get_or_fetch_fetches_once_then_serves_cache() {
        let slot: CachedSlot<u32> = CachedSlot::new();
        let fetches = AtomicUsize::new(0);

        let first = slot.get_or_fetch(|| counted_fetch(&fetches, 7)).await;
        let second = slot.get_or_fetch(|| counted_fetch(&fetches, 8)).await;
        assert_eq!(first, Ok(7));
        assert_eq!(second, Ok(7));
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reload_replaces_and_invalidate_forces_refetch() {
        let slot: CachedSlot<u32> = CachedSlot::new();
        let fetches = AtomicUsize::new(0);

        slot.set(1);
        let reloaded = slot.reload(|| counted_fetch(&fetches, 2)).await;
        assert_eq!(reloaded, Ok(2));
        assert_eq!(slot.peek(), Some(2));

        slot.invalidate();
        assert_eq!(slot.peek(), None);
        let refetched = slot.get_or_fetch(|| counted_fetch(&fetches, 3)).await;
        assert_eq!(refetched, Ok(3));
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_the_slot_empty() {
        let slot: CachedSlot<u32> = CachedSlot::new();
        let result: Result<u32, &str> = slot.get_or_fetch(|| async { Err("offline") }).await;
        assert_eq!(result, Err("offline"));
        assert_eq!(slot.peek(), None);
    }

    #[test]
    fn mutate_patches_only_existing_values() {
        let slot: CachedSlot<Vec<&str>> = CachedSlot::new();
        slot.mutate(|v| v.push("ignored"));
        assert_eq!(slot.peek(), None);

        slot.set(vec!["a"]);
        slot.mutate(|v| v.push("b"));
        assert_eq!(slot.peek(), Some(vec!["a", "b"]));
    }
}
