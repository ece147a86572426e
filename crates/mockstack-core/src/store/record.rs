use chrono::{DateTime, Utc};

use super::lifecycle::{Lifecycle, ResourceKind};

/// Key and ARN handed to a record factory before the payload exists.
#[derive(Debug, Clone, Copy)]
pub struct Identity<'a> {
    /// Store key of the record being created.
    pub key: &'a str,
    /// Synthesized ARN of the record being created.
    pub arn: &'a str,
}

/// A stored resource: identity, lifecycle metadata, and the domain payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T: ResourceKind> {
    /// Unique key within the store.
    pub key: String,
    /// Synthesized ARN.
    pub arn: String,
    /// Current lifecycle status.
    pub status: T::Status,
    /// Optimistic-concurrency version, present only for versioned kinds.
    pub version: Option<u64>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last payload update or status transition.
    pub updated_at: DateTime<Utc>,
    /// When a scheduled deletion takes effect.
    pub deletion_date: Option<DateTime<Utc>>,
    /// Service-specific fields.
    pub payload: T,
}

impl<T: ResourceKind> Record<T> {
    /// Whether the record is in a terminal status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Creation time as fractional epoch seconds, the way AWS JSON protocols
    /// encode timestamps.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn created_epoch_seconds(&self) -> f64 {
        self.created_at.timestamp_millis() as f64 / 1000.0
    }

    /// Whether the record is still visible at `now`.
    pub(crate) fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.deletion_date.is_none_or(|at| at > now)
    }

    /// Whether the key may be taken over by a new create.
    pub(crate) fn is_replaceable_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_live_at(now) || self.is_terminal()
    }
}
