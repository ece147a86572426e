//! Generic, concurrency-safe resource store.
//!
//! Every service module instantiates one [`ResourceStore`] per resource kind
//! and (account, region) partition. The store owns key uniqueness, ARN
//! synthesis, status lifecycles, deletion policies, per-family revision
//! counters, and optimistic versioning, so service modules only supply their
//! payload types and business validation.
//!
//! # Locking
//!
//! One `parking_lot::RwLock` guards each store. Reads take the read lock,
//! writes the write lock. Factories and mutators run under the write lock and
//! must be pure in-memory transforms.

mod lifecycle;
mod record;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::arn::Arn;
use crate::error::ErrorKind;
use crate::types::{AccountId, AwsRegion};

pub use lifecycle::{Deletion, Lifecycle, ResourceKind};
pub use record::{Identity, Record};

/// Failure of a store operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No live record under the key.
    #[error("{resource_type} {key} does not exist")]
    NotFound {
        /// Resource type of the store.
        resource_type: &'static str,
        /// Requested key.
        key: String,
    },

    /// A live record already uses the key.
    #[error("{resource_type} {key} already exists")]
    Conflict {
        /// Resource type of the store.
        resource_type: &'static str,
        /// Requested key.
        key: String,
    },

    /// The caller's version token is stale.
    #[error("{resource_type} {key} is at version {actual}, but version {expected} was expected")]
    VersionConflict {
        /// Resource type of the store.
        resource_type: &'static str,
        /// Requested key.
        key: String,
        /// Version supplied by the caller.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// The lifecycle does not allow the requested status change.
    #[error("{resource_type} {key} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Resource type of the store.
        resource_type: &'static str,
        /// Requested key.
        key: String,
        /// Current status.
        from: &'static str,
        /// Requested status.
        to: &'static str,
    },
}

impl StoreError {
    /// Wire-independent classification of the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::VersionConflict { .. } => ErrorKind::VersionConflict,
            Self::InvalidTransition { .. } => ErrorKind::Client,
        }
    }
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
struct Inner<T: ResourceKind> {
    records: HashMap<String, Record<T>>,
    /// Last revision handed out per family. Never decreases.
    revisions: HashMap<String, u64>,
}

/// Keyed store of [`Record`]s of one resource kind.
#[derive(Debug)]
pub struct ResourceStore<T: ResourceKind> {
    account: AccountId,
    region: AwsRegion,
    inner: RwLock<Inner<T>>,
}

impl<T: ResourceKind> ResourceStore<T> {
    /// Create an empty store whose ARNs use the given account and region.
    #[must_use]
    pub fn new(account: AccountId, region: AwsRegion) -> Self {
        Self {
            account,
            region,
            inner: RwLock::new(Inner {
                records: HashMap::new(),
                revisions: HashMap::new(),
            }),
        }
    }

    /// ARN a record stored under `key` has (or would have).
    #[must_use]
    pub fn arn_for(&self, key: &str) -> String {
        Arn::new(T::SERVICE, &self.region, &self.account, T::arn_resource(key)).to_string()
    }

    /// Create a record under a caller-chosen name.
    ///
    /// Fails with [`StoreError::Conflict`] when a live, non-terminal record
    /// already uses the key.
    pub fn create(
        &self,
        key: &str,
        factory: impl FnOnce(Identity<'_>) -> T,
    ) -> StoreResult<Record<T>> {
        self.insert_new(key, None, factory)
    }

    /// Create a record and move it from the initial status to `status` in the
    /// same write.
    ///
    /// Nothing is stored when the lifecycle forbids the move.
    pub fn create_in_status(
        &self,
        key: &str,
        status: T::Status,
        factory: impl FnOnce(Identity<'_>) -> T,
    ) -> StoreResult<Record<T>> {
        self.insert_new(key, Some(status), factory)
    }

    fn insert_new(
        &self,
        key: &str,
        status: Option<T::Status>,
        factory: impl FnOnce(Identity<'_>) -> T,
    ) -> StoreResult<Record<T>> {
        let now = Utc::now();
        let mut inner = self.inner.write();
        purge_expired(&mut inner.records, now);

        if inner
            .records
            .get(key)
            .is_some_and(|r| !r.is_replaceable_at(now))
        {
            return Err(conflict::<T>(key));
        }

        let mut record = self.build(key, now, factory);
        if let Some(status) = status {
            apply_transition(&mut record, status, now)?;
        }
        inner.records.insert(key.to_owned(), record.clone());
        tracing::debug!(resource_type = T::RESOURCE_TYPE, key, "created record");
        Ok(record)
    }

    /// Create a record under a server-generated key. Never conflicts.
    ///
    /// `shape_key` turns a fresh UUID into the stored key, e.g. to prefix it
    /// with a parent name. A key that is already taken is regenerated.
    pub fn create_with_generated_key(
        &self,
        shape_key: impl Fn(&str) -> String,
        factory: impl FnOnce(Identity<'_>) -> T,
    ) -> Record<T> {
        self.find_or_create_with_generated_key(|_| false, shape_key, factory)
            .0
    }

    /// Return the first live, non-terminal record accepted by `existing`, or
    /// create one under a server-generated key.
    ///
    /// The search and the insert happen under one write lock. The boolean is
    /// `true` when a new record was stored.
    pub fn find_or_create_with_generated_key(
        &self,
        existing: impl Fn(&T) -> bool,
        shape_key: impl Fn(&str) -> String,
        factory: impl FnOnce(Identity<'_>) -> T,
    ) -> (Record<T>, bool) {
        let now = Utc::now();
        let mut inner = self.inner.write();
        purge_expired(&mut inner.records, now);

        if let Some(found) = inner
            .records
            .values()
            .filter(|r| !r.is_terminal())
            .find(|r| existing(&r.payload))
        {
            return (found.clone(), false);
        }

        let key = loop {
            let key = shape_key(&uuid::Uuid::new_v4().to_string());
            if inner
                .records
                .get(&key)
                .is_none_or(|r| r.is_replaceable_at(now))
            {
                break key;
            }
        };
        let record = self.build(&key, now, factory);
        inner.records.insert(key, record.clone());
        tracing::debug!(resource_type = T::RESOURCE_TYPE, key = %record.key, "created record");
        (record, true)
    }

    /// Create a record, or return the existing one when it has the same
    /// definition.
    ///
    /// The boolean is `true` when a new record was stored. A live record with
    /// a different definition fails with [`StoreError::Conflict`].
    pub fn create_idempotent(
        &self,
        key: &str,
        factory: impl FnOnce(Identity<'_>) -> T,
    ) -> StoreResult<(Record<T>, bool)> {
        let now = Utc::now();
        let mut inner = self.inner.write();
        purge_expired(&mut inner.records, now);

        let candidate = self.build(key, now, factory);
        if let Some(existing) = inner.records.get(key) {
            if !existing.is_replaceable_at(now) {
                if existing.payload.same_definition(&candidate.payload) {
                    return Ok((existing.clone(), false));
                }
                return Err(conflict::<T>(key));
            }
        }

        inner.records.insert(key.to_owned(), candidate.clone());
        tracing::debug!(resource_type = T::RESOURCE_TYPE, key, "created record");
        Ok((candidate, true))
    }

    /// Create the next revision of `family`, stored under `family:N`.
    ///
    /// Revisions start at 1 and keep counting past deleted revisions.
    pub fn create_revision(
        &self,
        family: &str,
        factory: impl FnOnce(Identity<'_>, u64) -> T,
    ) -> Record<T> {
        let now = Utc::now();
        let mut inner = self.inner.write();
        purge_expired(&mut inner.records, now);

        let revision = {
            let counter = inner.revisions.entry(family.to_owned()).or_insert(0);
            *counter += 1;
            *counter
        };
        let key = format!("{family}:{revision}");
        let record = self.build(&key, now, |id| factory(id, revision));
        inner.records.insert(key, record.clone());
        tracing::debug!(resource_type = T::RESOURCE_TYPE, family, revision, "created revision");
        record
    }

    /// Latest revision number handed out for `family`, if any.
    #[must_use]
    pub fn latest_revision(&self, family: &str) -> Option<u64> {
        self.inner.read().revisions.get(family).copied()
    }

    /// Fetch a record.
    pub fn get(&self, key: &str) -> StoreResult<Record<T>> {
        let now = Utc::now();
        self.inner
            .read()
            .records
            .get(key)
            .filter(|r| r.is_live_at(now))
            .cloned()
            .ok_or_else(|| not_found::<T>(key))
    }

    /// Whether a live record exists under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_ok()
    }

    /// Fetch many records.
    ///
    /// An empty key list returns every live record sorted by key. Otherwise
    /// records come back in request order; missing keys are skipped, never
    /// reported.
    pub fn list<K: AsRef<str>>(&self, keys: &[K]) -> Vec<Record<T>> {
        let now = Utc::now();
        let inner = self.inner.read();

        if keys.is_empty() {
            let mut all: Vec<Record<T>> = inner
                .records
                .values()
                .filter(|r| r.is_live_at(now))
                .cloned()
                .collect();
            all.sort_by(|a, b| a.key.cmp(&b.key));
            return all;
        }

        let mut seen = HashSet::new();
        keys.iter()
            .map(AsRef::as_ref)
            .filter(|k| seen.insert(*k))
            .filter_map(|k| inner.records.get(k))
            .filter(|r| r.is_live_at(now))
            .cloned()
            .collect()
    }

    /// Apply `mutate` to the payload of a live, non-terminal record.
    ///
    /// For versioned kinds a supplied `expected_version` must match the stored
    /// version; a successful update increments it. Non-versioned kinds ignore
    /// the token. The mutator works on a copy, so an error leaves the stored
    /// record untouched.
    pub fn update<E, F>(
        &self,
        key: &str,
        expected_version: Option<u64>,
        mutate: F,
    ) -> Result<Record<T>, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut T) -> Result<(), E>,
    {
        let now = Utc::now();
        let mut inner = self.inner.write();
        purge_expired(&mut inner.records, now);

        let record = inner
            .records
            .get_mut(key)
            .filter(|r| !r.is_terminal())
            .ok_or_else(|| not_found::<T>(key))?;

        if let (Some(expected), Some(actual)) = (expected_version, record.version) {
            if expected != actual {
                return Err(StoreError::VersionConflict {
                    resource_type: T::RESOURCE_TYPE,
                    key: key.to_owned(),
                    expected,
                    actual,
                }
                .into());
            }
        }

        let mut payload = record.payload.clone();
        mutate(&mut payload)?;

        record.payload = payload;
        record.updated_at = now;
        if let Some(version) = record.version.as_mut() {
            *version += 1;
        }
        Ok(record.clone())
    }

    /// Move a record to `next` along its lifecycle.
    pub fn transition(&self, key: &str, next: T::Status) -> StoreResult<Record<T>> {
        let now = Utc::now();
        let mut inner = self.inner.write();
        purge_expired(&mut inner.records, now);

        let record = inner
            .records
            .get_mut(key)
            .ok_or_else(|| not_found::<T>(key))?;
        apply_transition(record, next, now)?;
        Ok(record.clone())
    }

    /// Delete a record according to the kind's [`Deletion`] policy.
    ///
    /// Returns the record as it stands after deletion: the removed record for
    /// [`Deletion::Erase`], the terminal or pending record otherwise. Deleting
    /// an already terminal record fails with [`StoreError::NotFound`].
    pub fn delete(&self, key: &str) -> StoreResult<Record<T>> {
        let now = Utc::now();
        let mut inner = self.inner.write();
        purge_expired(&mut inner.records, now);

        let policy = T::deletion();
        let record = inner
            .records
            .get_mut(key)
            .filter(|r| !r.is_terminal())
            .ok_or_else(|| not_found::<T>(key))?;

        let result = match policy {
            Deletion::Erase => inner.records.remove(key).ok_or_else(|| not_found::<T>(key)),
            Deletion::Retain(status) => {
                apply_transition(record, status, now)?;
                Ok(record.clone())
            }
            Deletion::Schedule { status, window } => {
                apply_transition(record, status, now)?;
                record.deletion_date = Some(now + window);
                Ok(record.clone())
            }
        };
        if result.is_ok() {
            tracing::debug!(resource_type = T::RESOURCE_TYPE, key, "deleted record");
        }
        result
    }

    /// Number of live records, terminal ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.inner
            .read()
            .records
            .values()
            .filter(|r| r.is_live_at(now))
            .count()
    }

    /// Whether the store holds no live records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every record and revision counter.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.records.clear();
        inner.revisions.clear();
    }

    fn build(
        &self,
        key: &str,
        now: DateTime<Utc>,
        factory: impl FnOnce(Identity<'_>) -> T,
    ) -> Record<T> {
        let arn = self.arn_for(key);
        let payload = factory(Identity { key, arn: &arn });
        Record {
            key: key.to_owned(),
            arn,
            status: T::Status::initial(),
            version: T::VERSIONED.then_some(1),
            created_at: now,
            updated_at: now,
            deletion_date: None,
            payload,
        }
    }
}

fn apply_transition<T: ResourceKind>(
    record: &mut Record<T>,
    next: T::Status,
    now: DateTime<Utc>,
) -> StoreResult<()> {
    if !record.status.can_transition_to(next) {
        return Err(StoreError::InvalidTransition {
            resource_type: T::RESOURCE_TYPE,
            key: record.key.clone(),
            from: record.status.as_str(),
            to: next.as_str(),
        });
    }
    record.status = next;
    record.updated_at = now;
    Ok(())
}

fn purge_expired<T: ResourceKind>(records: &mut HashMap<String, Record<T>>, now: DateTime<Utc>) {
    records.retain(|_, r| r.is_live_at(now));
}

fn not_found<T: ResourceKind>(key: &str) -> StoreError {
    StoreError::NotFound {
        resource_type: T::RESOURCE_TYPE,
        key: key.to_owned(),
    }
}

fn conflict<T: ResourceKind>(key: &str) -> StoreError {
    StoreError::Conflict {
        resource_type: T::RESOURCE_TYPE,
        key: key.to_owned(),
    }
}
