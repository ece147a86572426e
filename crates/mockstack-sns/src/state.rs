//! SNS resource kinds and per-partition state.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use mockstack_core::{AccountId, AwsRegion, Deletion, Lifecycle, ResourceKind, ResourceStore};

/// Status of a topic. Topics are usable as soon as they exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicStatus {
    /// The topic accepts subscriptions and messages.
    Active,
}

impl Lifecycle for TopicStatus {
    fn initial() -> Self {
        Self::Active
    }

    fn can_transition_to(self, _next: Self) -> bool {
        false
    }

    fn is_terminal(self) -> bool {
        false
    }

    fn as_str(self) -> &'static str {
        "Active"
    }
}

/// A topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    /// Topic name, also the store key.
    pub name: String,
    /// User-settable attributes.
    pub attributes: BTreeMap<String, String>,
    /// Tags.
    pub tags: BTreeMap<String, String>,
}

impl Topic {
    /// Whether the topic was created as a FIFO topic.
    #[must_use]
    pub fn is_fifo(&self) -> bool {
        self.attributes
            .get("FifoTopic")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

impl ResourceKind for Topic {
    type Status = TopicStatus;

    const SERVICE: &'static str = "sns";
    const RESOURCE_TYPE: &'static str = "topic";

    fn deletion() -> Deletion<TopicStatus> {
        Deletion::Erase
    }

    /// Topic ARNs end in the bare name: `arn:aws:sns:<region>:<account>:<name>`.
    fn arn_resource(key: &str) -> String {
        key.to_owned()
    }

    /// A re-create matches when every attribute it names has the stored value.
    fn same_definition(&self, other: &Self) -> bool {
        other
            .attributes
            .iter()
            .all(|(k, v)| self.attributes.get(k) == Some(v))
    }
}

/// Status of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// Deliveries are made to the endpoint.
    Confirmed,
}

impl Lifecycle for SubscriptionStatus {
    fn initial() -> Self {
        Self::Confirmed
    }

    fn can_transition_to(self, _next: Self) -> bool {
        false
    }

    fn is_terminal(self) -> bool {
        false
    }

    fn as_str(self) -> &'static str {
        "Confirmed"
    }
}

/// A subscription of an endpoint to a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Topic the subscription belongs to.
    pub topic_arn: String,
    /// Delivery protocol.
    pub protocol: String,
    /// Delivery endpoint.
    pub endpoint: String,
    /// Subscription attributes.
    pub attributes: BTreeMap<String, String>,
}

impl ResourceKind for Subscription {
    type Status = SubscriptionStatus;

    const SERVICE: &'static str = "sns";
    const RESOURCE_TYPE: &'static str = "subscription";

    fn deletion() -> Deletion<SubscriptionStatus> {
        Deletion::Erase
    }

    /// Subscription keys are `<topic>:<uuid>`, so the ARN extends the topic ARN.
    fn arn_resource(key: &str) -> String {
        key.to_owned()
    }
}

/// SNS state of one (account, region) partition.
#[derive(Debug)]
pub struct SnsState {
    /// Topics keyed by name.
    pub topics: ResourceStore<Topic>,
    /// Subscriptions keyed by `<topic>:<uuid>`.
    pub subscriptions: ResourceStore<Subscription>,
    sequence: AtomicU64,
}

impl SnsState {
    /// Create empty state for a partition.
    #[must_use]
    pub fn new(account: &AccountId, region: &AwsRegion) -> Self {
        Self {
            topics: ResourceStore::new(account.clone(), region.clone()),
            subscriptions: ResourceStore::new(account.clone(), region.clone()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Next FIFO sequence number, zero-padded to 20 digits.
    pub fn next_sequence_number(&self) -> String {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{n:020}")
    }

    /// Drop all topics and subscriptions.
    pub fn reset(&self) {
        self.topics.reset();
        self.subscriptions.reset();
        self.sequence.store(0, Ordering::Relaxed);
    }
}
