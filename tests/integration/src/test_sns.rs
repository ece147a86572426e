//! SNS topic, subscription, and publish flows through the gateway.

#[cfg(test)]
mod tests {
    use crate::{dispatcher, json_rpc, unique_name};

    #[tokio::test]
    async fn test_should_subscribe_publish_and_clean_up() {
        let d = dispatcher();
        let name = unique_name("events");

        let created = json_rpc(&d, "AmazonSNS.CreateTopic", serde_json::json!({"Name": name})).await;
        let topic_arn = created.body["TopicArn"].as_str().unwrap().to_owned();

        let subscribed = json_rpc(
            &d,
            "AmazonSNS.Subscribe",
            serde_json::json!({
                "TopicArn": topic_arn,
                "Protocol": "sqs",
                "Endpoint": "arn:aws:sqs:us-east-1:000000000000:inbox",
            }),
        )
        .await;
        assert_eq!(subscribed.status, http::StatusCode::OK);
        let subscription_arn = subscribed.body["SubscriptionArn"].as_str().unwrap().to_owned();
        assert!(subscription_arn.starts_with(&format!("{topic_arn}:")));

        let published = json_rpc(
            &d,
            "AmazonSNS.Publish",
            serde_json::json!({"TopicArn": topic_arn, "Message": "hello"}),
        )
        .await;
        assert_eq!(published.status, http::StatusCode::OK);
        assert!(published.body["MessageId"].is_string());

        let listed = json_rpc(
            &d,
            "AmazonSNS.ListSubscriptionsByTopic",
            serde_json::json!({"TopicArn": topic_arn}),
        )
        .await;
        assert_eq!(listed.body["Subscriptions"].as_array().unwrap().len(), 1);

        let deleted = json_rpc(
            &d,
            "AmazonSNS.DeleteTopic",
            serde_json::json!({"TopicArn": topic_arn}),
        )
        .await;
        assert_eq!(deleted.status, http::StatusCode::OK);

        let listed = json_rpc(&d, "AmazonSNS.ListTopics", serde_json::json!({})).await;
        assert_eq!(listed.body["Topics"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_should_reject_publish_to_missing_topic() {
        let d = dispatcher();
        let reply = json_rpc(
            &d,
            "AmazonSNS.Publish",
            serde_json::json!({
                "TopicArn": "arn:aws:sns:us-east-1:000000000000:missing",
                "Message": "hello",
            }),
        )
        .await;
        assert_eq!(reply.status, http::StatusCode::NOT_FOUND);
        assert_eq!(reply.body["__type"], "NotFoundException");
    }
}
