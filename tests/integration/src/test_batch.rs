//! Batch compute environment and job queue flows.

#[cfg(test)]
mod tests {
    use crate::{Reply, batch_client, dispatcher, rest, unique_name};

    async fn post(d: &mockstack_gateway::Dispatcher, op: &str, body: serde_json::Value) -> Reply {
        rest(d, http::Method::POST, &format!("/v1/{op}"), Some(body)).await
    }

    #[tokio::test]
    async fn test_should_guard_environment_referenced_by_queue() {
        let d = dispatcher();
        let ce = post(
            &d,
            "createcomputeenvironment",
            serde_json::json!({"computeEnvironmentName": "ce1", "type": "UNMANAGED"}),
        )
        .await;
        let ce_arn = ce.body["computeEnvironmentArn"].clone();

        let queue = post(
            &d,
            "createjobqueue",
            serde_json::json!({
                "jobQueueName": "q1",
                "priority": 10,
                "computeEnvironmentOrder": [{"order": 1, "computeEnvironment": "ce1"}],
            }),
        )
        .await;
        assert_eq!(queue.status, http::StatusCode::OK);

        let described = post(&d, "describejobqueues", serde_json::json!({"jobQueues": ["q1"]})).await;
        let detail = &described.body["jobQueues"][0];
        assert_eq!(detail["status"], "VALID");
        assert_eq!(detail["computeEnvironmentOrder"][0]["computeEnvironment"], ce_arn);

        let blocked = post(
            &d,
            "deletecomputeenvironment",
            serde_json::json!({"computeEnvironment": "ce1"}),
        )
        .await;
        assert_eq!(blocked.status, http::StatusCode::BAD_REQUEST);
        assert_eq!(blocked.body["__type"], "ClientException");

        let deleted = post(&d, "deletejobqueue", serde_json::json!({"jobQueue": "q1"})).await;
        assert_eq!(deleted.status, http::StatusCode::OK);

        let described = post(&d, "describejobqueues", serde_json::json!({"jobQueues": ["q1"]})).await;
        assert_eq!(described.body["jobQueues"][0]["status"], "DELETING");

        let freed = post(
            &d,
            "deletecomputeenvironment",
            serde_json::json!({"computeEnvironment": "ce1"}),
        )
        .await;
        assert_eq!(freed.status, http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_should_reject_queue_over_missing_environment() {
        let d = dispatcher();
        let reply = post(
            &d,
            "createjobqueue",
            serde_json::json!({
                "jobQueueName": "q1",
                "priority": 1,
                "computeEnvironmentOrder": [{"order": 1, "computeEnvironment": "nope"}],
            }),
        )
        .await;
        assert_eq!(reply.status, http::StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["__type"], "ClientException");
        assert_eq!(reply.headers["x-amzn-errortype"], "ClientException");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_and_delete_compute_environment_with_sdk() {
        use aws_sdk_batch::types::{CeStatus, CeType};

        let client = batch_client();
        let name = unique_name("ce");

        let created = client
            .create_compute_environment()
            .compute_environment_name(&name)
            .r#type(CeType::Unmanaged)
            .send()
            .await
            .expect("create compute environment");
        assert!(
            created
                .compute_environment_arn()
                .is_some_and(|arn| arn.ends_with(&format!("compute-environment/{name}")))
        );

        let described = client
            .describe_compute_environments()
            .compute_environments(&name)
            .send()
            .await
            .expect("describe compute environments");
        assert_eq!(described.compute_environments().len(), 1);
        assert_eq!(
            described.compute_environments()[0].status(),
            Some(&CeStatus::Valid)
        );

        client
            .delete_compute_environment()
            .compute_environment(&name)
            .send()
            .await
            .expect("delete compute environment");

        let described = client
            .describe_compute_environments()
            .compute_environments(&name)
            .send()
            .await
            .expect("describe compute environments");
        assert!(described.compute_environments().is_empty());
    }
}
