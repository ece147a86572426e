//! Cross-service routing tests against the in-process gateway.

#[cfg(test)]
mod tests {
    use crate::{Reply, authorization_for, dispatcher, json_rpc, json_rpc_with, rest, unique_name};

    #[tokio::test]
    async fn test_should_report_every_service_in_health() {
        let d = dispatcher();
        for path in ["/_localstack/health", "/health"] {
            let reply = rest(&d, http::Method::GET, path, None).await;
            assert_eq!(reply.status, http::StatusCode::OK);
            assert_eq!(reply.body["services"]["batch"], "running");
            assert_eq!(reply.body["services"]["sns"], "running");
            assert_eq!(reply.body["services"]["ecs"], "running");
        }
    }

    #[tokio::test]
    async fn test_should_route_each_protocol_to_its_service() {
        let d = dispatcher();

        let topic = json_rpc(
            &d,
            "AmazonSNS.CreateTopic",
            serde_json::json!({"Name": unique_name("topic")}),
        )
        .await;
        assert_eq!(topic.status, http::StatusCode::OK);
        assert!(topic.body["TopicArn"].as_str().unwrap().starts_with("arn:aws:sns:"));

        let cluster = json_rpc(
            &d,
            "AmazonEC2ContainerServiceV20141113.CreateCluster",
            serde_json::json!({"clusterName": "c1"}),
        )
        .await;
        assert_eq!(cluster.status, http::StatusCode::OK);
        assert_eq!(cluster.body["cluster"]["status"], "ACTIVE");

        let env = rest(
            &d,
            http::Method::POST,
            "/v1/createcomputeenvironment",
            Some(serde_json::json!({"computeEnvironmentName": "ce1", "type": "UNMANAGED"})),
        )
        .await;
        assert_eq!(env.status, http::StatusCode::OK);
        assert_eq!(env.body["computeEnvironmentName"], "ce1");
    }

    #[tokio::test]
    async fn test_should_stamp_request_id_and_checksum() {
        let d = dispatcher();
        let Reply { headers, raw, .. } =
            json_rpc(&d, "AmazonSNS.ListTopics", serde_json::json!({})).await;

        assert!(headers.contains_key("x-amzn-requestid"));
        let crc = crc32fast::hash(&raw).to_string();
        assert_eq!(headers["x-amz-crc32"], crc.as_str());
    }

    #[tokio::test]
    async fn test_should_answer_unclaimed_requests_with_neutral_not_found() {
        let d = dispatcher();

        let reply = json_rpc(&d, "AWSCognitoIdentityService.ListPools", serde_json::json!({})).await;
        assert_eq!(reply.status, http::StatusCode::NOT_FOUND);
        assert!(reply.headers.get("x-amzn-errortype").is_none());

        let reply = rest(&d, http::Method::GET, "/2015-03-31/functions", None).await;
        assert_eq!(reply.status, http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_should_reject_unknown_operation_of_known_service() {
        let d = dispatcher();
        let reply = json_rpc(&d, "AmazonSNS.ConfirmSubscription", serde_json::json!({})).await;
        assert_eq!(reply.status, http::StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["__type"], "UnknownOperationException");
    }

    #[tokio::test]
    async fn test_should_partition_state_by_region() {
        let d = dispatcher();
        let west = authorization_for("eu-west-1", "sns");

        let created = json_rpc_with(
            &d,
            "AmazonSNS.CreateTopic",
            Some(&west),
            serde_json::json!({"Name": "regional"}),
        )
        .await;
        assert_eq!(
            created.body["TopicArn"],
            "arn:aws:sns:eu-west-1:000000000000:regional"
        );

        let listed_west =
            json_rpc_with(&d, "AmazonSNS.ListTopics", Some(&west), serde_json::json!({})).await;
        assert_eq!(listed_west.body["Topics"].as_array().unwrap().len(), 1);

        let listed_default = json_rpc(&d, "AmazonSNS.ListTopics", serde_json::json!({})).await;
        assert_eq!(listed_default.body["Topics"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_should_converge_concurrent_idempotent_creates() {
        let d = std::sync::Arc::new(dispatcher());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let d = std::sync::Arc::clone(&d);
            handles.push(tokio::spawn(async move {
                json_rpc(
                    &d,
                    "AmazonEC2ContainerServiceV20141113.CreateCluster",
                    serde_json::json!({"clusterName": "shared"}),
                )
                .await
            }));
        }

        let mut arns = Vec::new();
        for handle in handles {
            let reply = handle.await.unwrap();
            assert_eq!(reply.status, http::StatusCode::OK);
            arns.push(reply.body["cluster"]["clusterArn"].clone());
        }
        arns.dedup();
        assert_eq!(arns.len(), 1);

        let listed = json_rpc(
            &d,
            "AmazonEC2ContainerServiceV20141113.ListClusters",
            serde_json::json!({}),
        )
        .await;
        assert_eq!(listed.body["clusterArns"].as_array().unwrap().len(), 1);
    }
}
