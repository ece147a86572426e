//! Per-kind declarations consumed by [`ResourceStore`](super::ResourceStore).

use std::fmt;

/// A resource status enum together with its state machine.
pub trait Lifecycle: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Status assigned when a record is created.
    fn initial() -> Self;

    /// Whether a record may move from `self` to `next`.
    fn can_transition_to(self, next: Self) -> bool;

    /// Whether the status marks a logically deleted resource.
    ///
    /// Terminal records stay readable but never block re-creation of their key
    /// and reject further updates.
    fn is_terminal(self) -> bool;

    /// Wire name of the status (e.g. `VALID`, `INACTIVE`).
    fn as_str(self) -> &'static str;
}

/// What `delete` does to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion<S> {
    /// Remove the record from the store.
    Erase,
    /// Keep the record and move it to the given terminal status.
    Retain(S),
    /// Move the record to `status` and drop it once `window` has elapsed.
    Schedule {
        /// Status held while deletion is pending.
        status: S,
        /// How long the record stays visible.
        window: chrono::Duration,
    },
}

/// A resource type stored in a [`ResourceStore`](super::ResourceStore).
///
/// Implemented by each service module's domain payload; everything the store
/// needs to know about the kind is declared here instead of being coded into
/// the store.
pub trait ResourceKind: Clone + Send + Sync + 'static {
    /// Status enum and state machine for the kind.
    type Status: Lifecycle;

    /// ARN service segment (e.g. `batch`).
    const SERVICE: &'static str;

    /// Resource type used in ARNs and error messages (e.g. `compute-environment`).
    const RESOURCE_TYPE: &'static str;

    /// Whether records carry an optimistic-concurrency version.
    const VERSIONED: bool = false;

    /// Deletion policy of the kind.
    fn deletion() -> Deletion<Self::Status>;

    /// Resource segment of the ARN for `key`.
    fn arn_resource(key: &str) -> String {
        format!("{}/{key}", Self::RESOURCE_TYPE)
    }

    /// Whether `other` defines the same resource as `self`.
    ///
    /// Consulted by idempotent creates only. The default never matches, which
    /// turns an idempotent create into a plain conflicting one.
    fn same_definition(&self, _other: &Self) -> bool {
        false
    }
}
