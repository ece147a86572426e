//! ECS cluster and task definition flows.

#[cfg(test)]
mod tests {
    use crate::{dispatcher, ecs_client, json_rpc, unique_name};

    const TARGET: &str = "AmazonEC2ContainerServiceV20141113";

    fn target(op: &str) -> String {
        format!("{TARGET}.{op}")
    }

    #[tokio::test]
    async fn test_should_walk_cluster_lifecycle() {
        let d = dispatcher();
        let name = unique_name("cluster");

        json_rpc(&d, &target("CreateCluster"), serde_json::json!({"clusterName": name})).await;

        let updated = json_rpc(
            &d,
            &target("UpdateClusterSettings"),
            serde_json::json!({
                "cluster": name,
                "settings": [{"name": "containerInsights", "value": "enabled"}],
            }),
        )
        .await;
        assert_eq!(updated.status, http::StatusCode::OK);
        assert_eq!(updated.body["cluster"]["settings"][0]["value"], "enabled");

        let deleted = json_rpc(&d, &target("DeleteCluster"), serde_json::json!({"cluster": name})).await;
        assert_eq!(deleted.body["cluster"]["status"], "INACTIVE");

        let listed = json_rpc(&d, &target("ListClusters"), serde_json::json!({})).await;
        assert_eq!(listed.body["clusterArns"], serde_json::json!([]));

        let described = json_rpc(
            &d,
            &target("DescribeClusters"),
            serde_json::json!({"clusters": [name]}),
        )
        .await;
        assert_eq!(described.body["clusters"][0]["status"], "INACTIVE");
    }

    #[tokio::test]
    async fn test_should_revision_task_definitions_per_family() {
        let d = dispatcher();
        let register = serde_json::json!({
            "family": "web",
            "containerDefinitions": [{"name": "app", "image": "nginx", "memory": 128}],
        });

        let first = json_rpc(&d, &target("RegisterTaskDefinition"), register.clone()).await;
        let second = json_rpc(&d, &target("RegisterTaskDefinition"), register).await;
        assert_eq!(first.body["taskDefinition"]["revision"], 1);
        assert_eq!(second.body["taskDefinition"]["revision"], 2);

        let deregistered = json_rpc(
            &d,
            &target("DeregisterTaskDefinition"),
            serde_json::json!({"taskDefinition": "web:2"}),
        )
        .await;
        assert_eq!(deregistered.body["taskDefinition"]["status"], "INACTIVE");

        let latest = json_rpc(
            &d,
            &target("DescribeTaskDefinition"),
            serde_json::json!({"taskDefinition": "web"}),
        )
        .await;
        assert_eq!(latest.body["taskDefinition"]["revision"], 1);

        let listed = json_rpc(&d, &target("ListTaskDefinitions"), serde_json::json!({})).await;
        assert_eq!(
            listed.body["taskDefinitionArns"],
            serde_json::json!(["arn:aws:ecs:us-east-1:000000000000:task-definition/web:1"])
        );
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_and_delete_cluster_with_sdk() {
        let client = ecs_client();
        let name = unique_name("sdk");

        let created = client
            .create_cluster()
            .cluster_name(&name)
            .send()
            .await
            .expect("create cluster");
        let cluster = created.cluster().expect("cluster in output");
        assert_eq!(cluster.cluster_name(), Some(name.as_str()));
        assert_eq!(cluster.status(), Some("ACTIVE"));

        let described = client
            .describe_clusters()
            .clusters(&name)
            .clusters("missing-cluster")
            .send()
            .await
            .expect("describe clusters");
        assert_eq!(described.clusters().len(), 1);
        assert_eq!(described.failures()[0].reason(), Some("MISSING"));

        let deleted = client
            .delete_cluster()
            .cluster(&name)
            .send()
            .await
            .expect("delete cluster");
        assert_eq!(deleted.cluster().and_then(|c| c.status()), Some("INACTIVE"));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_register_task_definition_with_sdk() {
        use aws_sdk_ecs::types::ContainerDefinition;

        let client = ecs_client();
        let family = unique_name("family");

        let registered = client
            .register_task_definition()
            .family(&family)
            .container_definitions(
                ContainerDefinition::builder()
                    .name("app")
                    .image("nginx")
                    .memory(128)
                    .build(),
            )
            .send()
            .await
            .expect("register task definition");
        let revision = registered
            .task_definition()
            .map(|td| td.revision())
            .expect("task definition in output");
        assert_eq!(revision, 1);

        let described = client
            .describe_task_definition()
            .task_definition(format!("{family}:1"))
            .send()
            .await
            .expect("describe task definition");
        let td = described.task_definition().expect("task definition in output");
        assert_eq!(td.family(), Some(family.as_str()));
        assert_eq!(td.container_definitions().len(), 1);

        let missing = client
            .describe_task_definition()
            .task_definition(format!("{family}:9"))
            .send()
            .await;
        assert!(missing.is_err());
    }
}
