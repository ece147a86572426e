//! SNS request and response shapes.
//!
//! Field names are `PascalCase` on the wire. Optional output fields are
//! omitted when `None`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A resource tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

/// Input for `CreateTopic`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateTopicInput {
    /// Topic name.
    pub name: String,
    /// Creation attributes (e.g. `DisplayName`, `FifoTopic`).
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Tags to attach.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Output of `CreateTopic`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateTopicOutput {
    /// ARN of the created or existing topic.
    pub topic_arn: String,
}

/// Input naming a topic by ARN.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopicArnInput {
    /// Topic ARN.
    pub topic_arn: String,
}

/// Output of `GetTopicAttributes`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetTopicAttributesOutput {
    /// Attribute map, including computed attributes.
    pub attributes: BTreeMap<String, String>,
}

/// Input for `SetTopicAttributes`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SetTopicAttributesInput {
    /// Topic ARN.
    pub topic_arn: String,
    /// Attribute to change.
    pub attribute_name: String,
    /// New value. Absent clears the attribute.
    #[serde(default)]
    pub attribute_value: Option<String>,
}

/// Input carrying only a pagination token.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListTopicsInput {
    /// Token from a previous page.
    #[serde(default)]
    pub next_token: Option<String>,
}

/// One entry of `ListTopics`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopicSummary {
    /// Topic ARN.
    pub topic_arn: String,
}

/// Output of `ListTopics`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListTopicsOutput {
    /// Topics on this page.
    pub topics: Vec<TopicSummary>,
    /// Token for the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

/// Input for `Subscribe`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscribeInput {
    /// Topic ARN.
    pub topic_arn: String,
    /// Delivery protocol (`sqs`, `https`, `email`, ...).
    pub protocol: String,
    /// Delivery endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Subscription attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Output of `Subscribe`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscribeOutput {
    /// ARN of the subscription.
    pub subscription_arn: String,
}

/// Input for `Unsubscribe`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UnsubscribeInput {
    /// Subscription ARN.
    pub subscription_arn: String,
}

/// Input for `ListSubscriptionsByTopic`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListSubscriptionsByTopicInput {
    /// Topic ARN.
    pub topic_arn: String,
    /// Token from a previous page.
    #[serde(default)]
    pub next_token: Option<String>,
}

/// One entry of `ListSubscriptionsByTopic`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscriptionSummary {
    /// Subscription ARN.
    pub subscription_arn: String,
    /// Owning account.
    pub owner: String,
    /// Delivery protocol.
    pub protocol: String,
    /// Delivery endpoint.
    pub endpoint: String,
    /// Topic ARN.
    pub topic_arn: String,
}

/// Output of `ListSubscriptionsByTopic`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListSubscriptionsByTopicOutput {
    /// Subscriptions on this page.
    pub subscriptions: Vec<SubscriptionSummary>,
    /// Token for the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------

/// Input for `Publish`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublishInput {
    /// Topic ARN.
    #[serde(default)]
    pub topic_arn: Option<String>,
    /// Alternative to `TopicArn`.
    #[serde(default)]
    pub target_arn: Option<String>,
    /// Message body.
    #[serde(default)]
    pub message: String,
    /// Email subject.
    #[serde(default)]
    pub subject: Option<String>,
    /// FIFO ordering group.
    #[serde(default)]
    pub message_group_id: Option<String>,
    /// FIFO deduplication id.
    #[serde(default)]
    pub message_deduplication_id: Option<String>,
}

/// Output of `Publish`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublishOutput {
    /// Id of the published message.
    pub message_id: String,
    /// Position in a FIFO topic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<String>,
}
