//! SNS operation enum.

use std::fmt;

/// All supported SNS operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnsOperation {
    // Topics
    /// Create a topic, or return the existing one with the same attributes.
    CreateTopic,
    /// Delete a topic and its subscriptions.
    DeleteTopic,
    /// Read topic attributes.
    GetTopicAttributes,
    /// Change one topic attribute.
    SetTopicAttributes,
    /// List topics.
    ListTopics,

    // Subscriptions
    /// Subscribe an endpoint to a topic.
    Subscribe,
    /// Remove a subscription.
    Unsubscribe,
    /// List the subscriptions of a topic.
    ListSubscriptionsByTopic,

    // Messaging
    /// Publish a message to a topic.
    Publish,
}

impl SnsOperation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::CreateTopic,
        Self::DeleteTopic,
        Self::GetTopicAttributes,
        Self::SetTopicAttributes,
        Self::ListTopics,
        Self::Subscribe,
        Self::Unsubscribe,
        Self::ListSubscriptionsByTopic,
        Self::Publish,
    ];

    /// Returns the AWS operation name string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateTopic => "CreateTopic",
            Self::DeleteTopic => "DeleteTopic",
            Self::GetTopicAttributes => "GetTopicAttributes",
            Self::SetTopicAttributes => "SetTopicAttributes",
            Self::ListTopics => "ListTopics",
            Self::Subscribe => "Subscribe",
            Self::Unsubscribe => "Unsubscribe",
            Self::ListSubscriptionsByTopic => "ListSubscriptionsByTopic",
            Self::Publish => "Publish",
        }
    }

    /// Parse an operation name string into an `SnsOperation`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }
}

impl fmt::Display for SnsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
