//! Multi-account, multi-region state partitioning.
//!
//! Each emulated service keeps one state bundle per (account, region) pair.
//! The bundle owns that partition's resource stores, so ARNs synthesized by
//! those stores always carry the partition's account and region.

use std::sync::Arc;

use dashmap::DashMap;

use crate::types::{AccountId, AwsRegion};

/// Thread-safe map from (account, region) to a lazily built state bundle.
///
/// # Examples
///
/// ```
/// use mockstack_core::{AccountId, AccountRegionStore, AwsRegion};
///
/// #[derive(Debug)]
/// struct Partition {
///     region: AwsRegion,
/// }
///
/// let store = AccountRegionStore::<Partition>::new();
/// let state = store.get_or_create_with(&AccountId::default(), &AwsRegion::default(), |_, r| {
///     Partition { region: r.clone() }
/// });
/// assert_eq!(state.region.as_str(), "us-east-1");
/// ```
#[derive(Debug)]
pub struct AccountRegionStore<T: Send + Sync> {
    inner: DashMap<(AccountId, AwsRegion), Arc<T>>,
}

impl<T: Send + Sync> AccountRegionStore<T> {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Get the state for the partition, building it with `init` on first access.
    ///
    /// Construction happens under the shard lock, so concurrent first accesses
    /// observe one and the same instance.
    pub fn get_or_create_with(
        &self,
        account: &AccountId,
        region: &AwsRegion,
        init: impl FnOnce(&AccountId, &AwsRegion) -> T,
    ) -> Arc<T> {
        self.inner
            .entry((account.clone(), region.clone()))
            .or_insert_with(|| {
                tracing::debug!(%account, %region, "initializing partition state");
                Arc::new(init(account, region))
            })
            .clone()
    }

    /// Get the state for the given account and region, if it exists.
    #[must_use]
    pub fn get(&self, account: &AccountId, region: &AwsRegion) -> Option<Arc<T>> {
        self.inner
            .get(&(account.clone(), region.clone()))
            .map(|v| Arc::clone(v.value()))
    }

    /// Drop every partition.
    pub fn reset(&self) {
        self.inner.clear();
    }

    /// Number of (account, region) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Default + Send + Sync> AccountRegionStore<T> {
    /// Get or create a default-initialized state for the partition.
    #[must_use]
    pub fn get_or_create(&self, account: &AccountId, region: &AwsRegion) -> Arc<T> {
        self.get_or_create_with(account, region, |_, _| T::default())
    }
}

impl<T: Send + Sync> Default for AccountRegionStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    #[derive(Debug, Default)]
    struct TestState {
        value: AtomicU64,
    }

    #[test]
    fn test_should_return_same_state_on_subsequent_access() {
        let store = AccountRegionStore::<TestState>::new();
        let account = AccountId::default();
        let region = AwsRegion::default();

        let first = store.get_or_create(&account, &region);
        first.value.store(42, Ordering::Relaxed);

        let second = store.get_or_create(&account, &region);
        assert_eq!(second.value.load(Ordering::Relaxed), 42);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_should_isolate_different_regions() {
        let store = AccountRegionStore::<TestState>::new();
        let account = AccountId::default();

        let us = store.get_or_create(&account, &AwsRegion::new("us-east-1"));
        us.value.store(1, Ordering::Relaxed);

        let eu = store.get_or_create(&account, &AwsRegion::new("eu-west-1"));
        assert_eq!(eu.value.load(Ordering::Relaxed), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_should_build_with_partition_identity() {
        let store = AccountRegionStore::<String>::new();
        let state = store.get_or_create_with(
            &AccountId::new("123456789012").unwrap(),
            &AwsRegion::new("ap-south-1"),
            |a, r| format!("{a}/{r}"),
        );
        assert_eq!(state.as_str(), "123456789012/ap-south-1");
        assert!(store.get(&AccountId::default(), &AwsRegion::default()).is_none());
    }

    #[test]
    fn test_should_reset_all_state() {
        let store = AccountRegionStore::<TestState>::new();
        let _ = store.get_or_create(&AccountId::default(), &AwsRegion::default());
        store.reset();
        assert!(store.is_empty());
    }
}
