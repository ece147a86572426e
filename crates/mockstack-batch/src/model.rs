//! Batch request and response shapes.
//!
//! Field names are `camelCase` on the wire. Optional output fields are
//! omitted when `None`, empty collections when empty.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Compute environments
// ---------------------------------------------------------------------------

/// Input for `CreateComputeEnvironment`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComputeEnvironmentInput {
    /// Environment name.
    pub compute_environment_name: String,
    /// `MANAGED` or `UNMANAGED`.
    #[serde(rename = "type", default)]
    pub ce_type: String,
    /// `ENABLED` (default) or `DISABLED`.
    #[serde(default)]
    pub state: Option<String>,
    /// Opaque compute resource definition.
    #[serde(default)]
    pub compute_resources: Option<serde_json::Value>,
    /// IAM role Batch assumes.
    #[serde(default)]
    pub service_role: Option<String>,
    /// vCPUs of an unmanaged environment.
    #[serde(default)]
    pub unmanagedv_cpus: Option<i64>,
    /// Tags to attach.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Output of create and update operations on compute environments.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeEnvironmentOutput {
    /// Environment name.
    pub compute_environment_name: String,
    /// Environment ARN.
    pub compute_environment_arn: String,
}

/// Input for `DescribeComputeEnvironments`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeComputeEnvironmentsInput {
    /// Names or ARNs. Empty describes all.
    #[serde(default)]
    pub compute_environments: Vec<String>,
    /// Page size.
    #[serde(default)]
    pub max_results: Option<usize>,
    /// Token from a previous page.
    #[serde(default)]
    pub next_token: Option<String>,
}

/// A compute environment as described on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeEnvironmentDetail {
    /// Environment name.
    pub compute_environment_name: String,
    /// Environment ARN.
    pub compute_environment_arn: String,
    /// ECS cluster backing the environment.
    pub ecs_cluster_arn: String,
    /// Tags.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    /// `MANAGED` or `UNMANAGED`.
    #[serde(rename = "type")]
    pub ce_type: String,
    /// `ENABLED` or `DISABLED`.
    pub state: String,
    /// Lifecycle status.
    pub status: String,
    /// Human-readable status detail.
    pub status_reason: String,
    /// Compute resource definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute_resources: Option<serde_json::Value>,
    /// IAM role Batch assumes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_role: Option<String>,
    /// vCPUs of an unmanaged environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmanagedv_cpus: Option<i64>,
    /// Unique id.
    pub uuid: String,
    /// Always `ECS`.
    pub container_orchestration_type: &'static str,
}

/// Output of `DescribeComputeEnvironments`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeComputeEnvironmentsOutput {
    /// Matching environments.
    pub compute_environments: Vec<ComputeEnvironmentDetail>,
    /// Token for the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Input for `UpdateComputeEnvironment`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComputeEnvironmentInput {
    /// Name or ARN.
    pub compute_environment: String,
    /// New state.
    #[serde(default)]
    pub state: Option<String>,
    /// Replacement compute resources.
    #[serde(default)]
    pub compute_resources: Option<serde_json::Value>,
    /// Replacement service role.
    #[serde(default)]
    pub service_role: Option<String>,
    /// Replacement vCPU count.
    #[serde(default)]
    pub unmanagedv_cpus: Option<i64>,
}

/// Input for `DeleteComputeEnvironment`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteComputeEnvironmentInput {
    /// Name or ARN.
    pub compute_environment: String,
}

// ---------------------------------------------------------------------------
// Job queues
// ---------------------------------------------------------------------------

/// One entry of a job queue's environment list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeEnvironmentOrder {
    /// Position; lower runs first.
    pub order: i64,
    /// Environment name or ARN. Stored as the ARN.
    pub compute_environment: String,
}

/// Input for `CreateJobQueue`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobQueueInput {
    /// Queue name.
    pub job_queue_name: String,
    /// `ENABLED` (default) or `DISABLED`.
    #[serde(default)]
    pub state: Option<String>,
    /// Scheduling priority.
    #[serde(default)]
    pub priority: Option<i64>,
    /// Environments jobs are placed on.
    #[serde(default)]
    pub compute_environment_order: Vec<ComputeEnvironmentOrder>,
    /// Tags to attach.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Output of create and update operations on job queues.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQueueOutput {
    /// Queue name.
    pub job_queue_name: String,
    /// Queue ARN.
    pub job_queue_arn: String,
}

/// Input for `DescribeJobQueues`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeJobQueuesInput {
    /// Names or ARNs. Empty describes all.
    #[serde(default)]
    pub job_queues: Vec<String>,
    /// Page size.
    #[serde(default)]
    pub max_results: Option<usize>,
    /// Token from a previous page.
    #[serde(default)]
    pub next_token: Option<String>,
}

/// A job queue as described on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQueueDetail {
    /// Queue name.
    pub job_queue_name: String,
    /// Queue ARN.
    pub job_queue_arn: String,
    /// `ENABLED` or `DISABLED`.
    pub state: String,
    /// Lifecycle status.
    pub status: String,
    /// Human-readable status detail.
    pub status_reason: String,
    /// Scheduling priority.
    pub priority: i64,
    /// Environments jobs are placed on.
    pub compute_environment_order: Vec<ComputeEnvironmentOrder>,
    /// Tags.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// Output of `DescribeJobQueues`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeJobQueuesOutput {
    /// Matching queues.
    pub job_queues: Vec<JobQueueDetail>,
    /// Token for the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Input for `UpdateJobQueue`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobQueueInput {
    /// Name or ARN.
    pub job_queue: String,
    /// New state.
    #[serde(default)]
    pub state: Option<String>,
    /// New priority.
    #[serde(default)]
    pub priority: Option<i64>,
    /// Replacement environment list.
    #[serde(default)]
    pub compute_environment_order: Option<Vec<ComputeEnvironmentOrder>>,
}

/// Input for `DeleteJobQueue`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteJobQueueInput {
    /// Name or ARN.
    pub job_queue: String,
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Body of `TagResource`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResourceInput {
    /// Tags to add or overwrite.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Output of `ListTagsForResource`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTagsForResourceOutput {
    /// The resource's tags.
    pub tags: BTreeMap<String, String>,
}
