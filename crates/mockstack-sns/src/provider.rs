//! SNS provider implementing all operations.

use std::collections::BTreeMap;
use std::sync::Arc;

use mockstack_core::{AccountRegionStore, Arn, ErrorKind, Record};
use mockstack_gateway::{RequestContext, ServiceError};

use crate::error::{invalid_parameter, not_found, store_error_to_sns};
use crate::model::{
    CreateTopicInput, CreateTopicOutput, GetTopicAttributesOutput, ListSubscriptionsByTopicInput,
    ListSubscriptionsByTopicOutput, ListTopicsInput, ListTopicsOutput, PublishInput, PublishOutput,
    SetTopicAttributesInput, SubscribeInput, SubscribeOutput, SubscriptionSummary, TopicArnInput,
    TopicSummary, UnsubscribeInput,
};
use crate::state::{SnsState, Subscription, Topic};

/// Entries per `ListTopics` / `ListSubscriptionsByTopic` page.
const PAGE_SIZE: usize = 100;

/// Largest accepted message body in bytes.
const MAX_MESSAGE_BYTES: usize = 256 * 1024;

/// Attributes `SetTopicAttributes` may change.
const SETTABLE_ATTRIBUTES: [&str; 7] = [
    "DisplayName",
    "Policy",
    "DeliveryPolicy",
    "KmsMasterKeyId",
    "TracingConfig",
    "SignatureVersion",
    "ContentBasedDeduplication",
];

/// Delivery protocols accepted by `Subscribe`.
const PROTOCOLS: [&str; 9] = [
    "http",
    "https",
    "email",
    "email-json",
    "sms",
    "sqs",
    "application",
    "lambda",
    "firehose",
];

/// Main SNS provider.
#[derive(Debug, Default)]
pub struct MockStackSns {
    state: AccountRegionStore<SnsState>,
}

impl MockStackSns {
    /// Create a provider with no topics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State of the request's partition.
    fn state(&self, ctx: &RequestContext) -> Arc<SnsState> {
        self.state
            .get_or_create_with(&ctx.account, &ctx.region, SnsState::new)
    }

    /// Reset all state (for testing).
    pub fn reset(&self) {
        self.state.reset();
    }
}

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

impl MockStackSns {
    /// Handle `CreateTopic`.
    ///
    /// Re-creating a topic with attributes that match the stored ones returns
    /// the existing ARN.
    pub fn handle_create_topic(
        &self,
        ctx: &RequestContext,
        input: CreateTopicInput,
    ) -> Result<CreateTopicOutput, ServiceError> {
        validate_topic_name(&input.name, &input.attributes)?;

        let state = self.state(ctx);
        let CreateTopicInput {
            name,
            attributes,
            tags,
        } = input;
        let (record, created) = state
            .topics
            .create_idempotent(&name, |_| Topic {
                name: name.clone(),
                attributes,
                tags: tags.into_iter().map(|t| (t.key, t.value)).collect(),
            })
            .map_err(store_error_to_sns)?;

        if created {
            tracing::info!(topic_arn = %record.arn, "created topic");
        }
        Ok(CreateTopicOutput {
            topic_arn: record.arn,
        })
    }

    /// Handle `DeleteTopic`. Deleting a missing topic succeeds.
    pub fn handle_delete_topic(
        &self,
        ctx: &RequestContext,
        input: &TopicArnInput,
    ) -> Result<(), ServiceError> {
        let name = topic_name(&input.topic_arn)?;
        let state = self.state(ctx);

        if state.topics.arn_for(name) != input.topic_arn || state.topics.delete(name).is_err() {
            tracing::debug!(topic_arn = %input.topic_arn, "deleting missing topic");
            return Ok(());
        }

        let orphans: Vec<String> = state
            .subscriptions
            .list::<&str>(&[])
            .into_iter()
            .filter(|s| s.payload.topic_arn == input.topic_arn)
            .map(|s| s.key)
            .collect();
        for key in orphans {
            // Concurrent unsubscribes may already have removed it.
            let _ = state.subscriptions.delete(&key);
        }
        Ok(())
    }

    /// Handle `GetTopicAttributes`.
    pub fn handle_get_topic_attributes(
        &self,
        ctx: &RequestContext,
        input: &TopicArnInput,
    ) -> Result<GetTopicAttributesOutput, ServiceError> {
        let state = self.state(ctx);
        let topic = require_topic(&state, &input.topic_arn)?;

        let confirmed = state
            .subscriptions
            .list::<&str>(&[])
            .iter()
            .filter(|s| s.payload.topic_arn == topic.arn)
            .count();

        let mut attributes = BTreeMap::from([
            ("TopicArn".to_owned(), topic.arn.clone()),
            ("Owner".to_owned(), ctx.account.to_string()),
            ("DisplayName".to_owned(), String::new()),
            ("SubscriptionsConfirmed".to_owned(), confirmed.to_string()),
            ("SubscriptionsPending".to_owned(), "0".to_owned()),
            ("SubscriptionsDeleted".to_owned(), "0".to_owned()),
        ]);
        attributes.extend(topic.payload.attributes);
        Ok(GetTopicAttributesOutput { attributes })
    }

    /// Handle `SetTopicAttributes`.
    pub fn handle_set_topic_attributes(
        &self,
        ctx: &RequestContext,
        input: SetTopicAttributesInput,
    ) -> Result<(), ServiceError> {
        if !SETTABLE_ATTRIBUTES.contains(&input.attribute_name.as_str()) {
            return Err(invalid_parameter(format!(
                "Invalid parameter: AttributeName {}",
                input.attribute_name
            )));
        }
        let name = topic_name(&input.topic_arn)?;
        let state = self.state(ctx);
        if state.topics.arn_for(name) != input.topic_arn {
            return Err(not_found("Topic does not exist"));
        }

        let SetTopicAttributesInput {
            attribute_name,
            attribute_value,
            ..
        } = input;
        state
            .topics
            .update(name, None, |topic| {
                if attribute_name == "ContentBasedDeduplication" && !topic.is_fifo() {
                    return Err(invalid_parameter(
                        "Invalid parameter: ContentBasedDeduplication Reason: Content-based \
                         deduplication can only be set for FIFO topics",
                    ));
                }
                match attribute_value {
                    Some(value) => topic.attributes.insert(attribute_name, value),
                    None => topic.attributes.remove(&attribute_name),
                };
                Ok(())
            })
            .map_err(|e: ServiceError| {
                if e.kind == ErrorKind::NotFound {
                    not_found("Topic does not exist")
                } else {
                    e
                }
            })?;
        Ok(())
    }

    /// Handle `ListTopics`.
    pub fn handle_list_topics(
        &self,
        ctx: &RequestContext,
        input: &ListTopicsInput,
    ) -> Result<ListTopicsOutput, ServiceError> {
        let topics: Vec<TopicSummary> = self
            .state(ctx)
            .topics
            .list::<&str>(&[])
            .into_iter()
            .map(|r| TopicSummary { topic_arn: r.arn })
            .collect();
        let (topics, next_token) = paginate(topics, input.next_token.as_deref())?;
        Ok(ListTopicsOutput { topics, next_token })
    }
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

impl MockStackSns {
    /// Handle `Subscribe`.
    ///
    /// Subscribing the same endpoint twice returns the existing subscription.
    pub fn handle_subscribe(
        &self,
        ctx: &RequestContext,
        input: SubscribeInput,
    ) -> Result<SubscribeOutput, ServiceError> {
        let protocol = input.protocol.to_lowercase();
        if !PROTOCOLS.contains(&protocol.as_str()) {
            return Err(invalid_parameter(format!(
                "Invalid parameter: Amazon SNS does not support this protocol string: {}",
                input.protocol
            )));
        }
        let endpoint = input
            .endpoint
            .filter(|e| !e.is_empty())
            .ok_or_else(|| invalid_parameter("Invalid parameter: Endpoint"))?;

        let state = self.state(ctx);
        let topic = require_topic(&state, &input.topic_arn)?;

        let topic_name = &topic.payload.name;
        let (record, created) = state.subscriptions.find_or_create_with_generated_key(
            |s| s.topic_arn == topic.arn && s.protocol == protocol && s.endpoint == endpoint,
            |id| format!("{topic_name}:{id}"),
            |_| Subscription {
                topic_arn: topic.arn.clone(),
                protocol: protocol.clone(),
                endpoint: endpoint.clone(),
                attributes: input.attributes,
            },
        );
        if !created {
            return Ok(SubscribeOutput {
                subscription_arn: record.arn,
            });
        }

        tracing::info!(subscription_arn = %record.arn, "created subscription");
        Ok(SubscribeOutput {
            subscription_arn: record.arn,
        })
    }

    /// Handle `Unsubscribe`.
    pub fn handle_unsubscribe(
        &self,
        ctx: &RequestContext,
        input: &UnsubscribeInput,
    ) -> Result<(), ServiceError> {
        let key = Arn::parse(&input.subscription_arn)
            .filter(|arn| arn.service() == "sns" && arn.resource().contains(':'))
            .ok_or_else(|| invalid_parameter("Invalid parameter: SubscriptionArn"))?;
        self.state(ctx)
            .subscriptions
            .delete(key.resource())
            .map_err(store_error_to_sns)?;
        Ok(())
    }

    /// Handle `ListSubscriptionsByTopic`.
    pub fn handle_list_subscriptions_by_topic(
        &self,
        ctx: &RequestContext,
        input: &ListSubscriptionsByTopicInput,
    ) -> Result<ListSubscriptionsByTopicOutput, ServiceError> {
        let state = self.state(ctx);
        let topic = require_topic(&state, &input.topic_arn)?;

        let subscriptions: Vec<SubscriptionSummary> = state
            .subscriptions
            .list::<&str>(&[])
            .into_iter()
            .filter(|s| s.payload.topic_arn == topic.arn)
            .map(|s| SubscriptionSummary {
                subscription_arn: s.arn,
                owner: ctx.account.to_string(),
                protocol: s.payload.protocol,
                endpoint: s.payload.endpoint,
                topic_arn: s.payload.topic_arn,
            })
            .collect();
        let (subscriptions, next_token) = paginate(subscriptions, input.next_token.as_deref())?;
        Ok(ListSubscriptionsByTopicOutput {
            subscriptions,
            next_token,
        })
    }
}

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------

impl MockStackSns {
    /// Handle `Publish`.
    pub fn handle_publish(
        &self,
        ctx: &RequestContext,
        input: &PublishInput,
    ) -> Result<PublishOutput, ServiceError> {
        let arn = input
            .topic_arn
            .as_deref()
            .or(input.target_arn.as_deref())
            .ok_or_else(|| invalid_parameter("Invalid parameter: TopicArn or TargetArn"))?;
        if input.message.is_empty() {
            return Err(invalid_parameter("Invalid parameter: Empty message"));
        }
        if input.message.len() > MAX_MESSAGE_BYTES {
            return Err(invalid_parameter("Invalid parameter: Message too long"));
        }

        let state = self.state(ctx);
        let topic = require_topic(&state, arn)?;

        let sequence_number = if topic.payload.is_fifo() {
            if input.message_group_id.is_none() {
                return Err(invalid_parameter(
                    "Invalid parameter: The MessageGroupId parameter is required for FIFO topics",
                ));
            }
            let dedup_by_content = topic
                .payload
                .attributes
                .get("ContentBasedDeduplication")
                .is_some_and(|v| v.eq_ignore_ascii_case("true"));
            if input.message_deduplication_id.is_none() && !dedup_by_content {
                return Err(invalid_parameter(
                    "Invalid parameter: The topic should either have ContentBasedDeduplication \
                     enabled or MessageDeduplicationId provided explicitly",
                ));
            }
            Some(state.next_sequence_number())
        } else {
            if input.message_group_id.is_some() {
                return Err(invalid_parameter(
                    "Invalid parameter: MessageGroupId Reason: The request includes \
                     MessageGroupId parameter that is not valid for this topic type",
                ));
            }
            None
        };

        let deliveries = state
            .subscriptions
            .list::<&str>(&[])
            .iter()
            .filter(|s| s.payload.topic_arn == topic.arn)
            .count();
        let message_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(
            topic_arn = %topic.arn,
            %message_id,
            subject = input.subject.as_deref(),
            deliveries,
            "published message"
        );

        Ok(PublishOutput {
            message_id,
            sequence_number,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a topic by ARN. ARNs of another partition are not found.
fn require_topic(state: &SnsState, arn: &str) -> Result<Record<Topic>, ServiceError> {
    let name = topic_name(arn)?;
    let topic = state.topics.get(name).map_err(store_error_to_sns)?;
    if topic.arn == arn {
        Ok(topic)
    } else {
        Err(not_found("Topic does not exist"))
    }
}

/// Topic name from a topic ARN.
fn topic_name(arn: &str) -> Result<&str, ServiceError> {
    Arn::parse(arn)
        .filter(|a| a.service() == "sns" && !a.resource().contains(':'))
        .map(|_| arn.rsplit(':').next().unwrap_or_default())
        .ok_or_else(|| invalid_parameter("Invalid parameter: TopicArn"))
}

/// Validate a topic name: 1-256 of `[A-Za-z0-9_-]`, plus `.fifo` for FIFO
/// topics.
fn validate_topic_name(
    name: &str,
    attributes: &BTreeMap<String, String>,
) -> Result<(), ServiceError> {
    let fifo = attributes
        .get("FifoTopic")
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    let stem = if fifo {
        name.strip_suffix(".fifo").ok_or_else(|| {
            invalid_parameter("Fifo Topic names must end with .fifo and must be made up of only uppercase and lowercase ASCII letters, numbers, underscores, and hyphens, and must be between 1 and 256 characters long.")
        })?
    } else {
        name
    };

    let valid = !name.is_empty()
        && name.len() <= 256
        && stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(invalid_parameter("Invalid parameter: Topic Name"))
    }
}

/// Slice one page out of `items`. The token is the offset of the page.
fn paginate<T>(
    items: Vec<T>,
    token: Option<&str>,
) -> Result<(Vec<T>, Option<String>), ServiceError> {
    let start = match token {
        Some(t) => t
            .parse::<usize>()
            .map_err(|_| invalid_parameter("Invalid parameter: NextToken"))?,
        None => 0,
    };
    let end = start.saturating_add(PAGE_SIZE);
    let next = (items.len() > end).then(|| end.to_string());
    let page = items.into_iter().skip(start).take(PAGE_SIZE).collect();
    Ok((page, next))
}
