//! ECS resource kinds and per-partition state.

use mockstack_core::{AccountId, AwsRegion, Deletion, Lifecycle, ResourceKind, ResourceStore};

use crate::model::{ClusterSetting, Tag};

/// `ACTIVE` / `INACTIVE` lifecycle shared by clusters and task definitions.
///
/// Deletion keeps the record as `INACTIVE`; nothing comes back from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcsStatus {
    /// In use.
    Active,
    /// Deleted or deregistered.
    Inactive,
}

impl Lifecycle for EcsStatus {
    fn initial() -> Self {
        Self::Active
    }

    fn can_transition_to(self, next: Self) -> bool {
        matches!((self, next), (Self::Active, Self::Inactive))
    }

    fn is_terminal(self) -> bool {
        self == Self::Inactive
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }
}

/// A cluster. Records are versioned so settings updates can detect races.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterData {
    /// Settings such as `containerInsights`.
    pub settings: Vec<ClusterSetting>,
    /// Capacity providers attached at creation.
    pub capacity_providers: Vec<String>,
    /// Tags.
    pub tags: Vec<Tag>,
}

impl ResourceKind for ClusterData {
    type Status = EcsStatus;

    const SERVICE: &'static str = "ecs";
    const RESOURCE_TYPE: &'static str = "cluster";
    const VERSIONED: bool = true;

    fn deletion() -> Deletion<EcsStatus> {
        Deletion::Retain(EcsStatus::Inactive)
    }

    /// Re-creating an active cluster returns it unchanged.
    fn same_definition(&self, _other: &Self) -> bool {
        true
    }
}

/// One revision of a task definition family, stored under `family:revision`.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub struct TaskDefinitionData {
    pub family: String,
    pub revision: u64,
    pub container_definitions: Vec<serde_json::Value>,
    pub volumes: Vec<serde_json::Value>,
    pub task_role_arn: Option<String>,
    pub execution_role_arn: Option<String>,
    pub network_mode: Option<String>,
    pub requires_compatibilities: Vec<String>,
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub tags: Vec<Tag>,
}

impl ResourceKind for TaskDefinitionData {
    type Status = EcsStatus;

    const SERVICE: &'static str = "ecs";
    const RESOURCE_TYPE: &'static str = "task-definition";

    fn deletion() -> Deletion<EcsStatus> {
        Deletion::Retain(EcsStatus::Inactive)
    }
}

/// ECS state of one (account, region) partition.
#[derive(Debug)]
pub struct EcsState {
    /// Clusters keyed by name.
    pub clusters: ResourceStore<ClusterData>,
    /// Task definitions keyed by `family:revision`.
    pub task_definitions: ResourceStore<TaskDefinitionData>,
}

impl EcsState {
    /// Create empty state for a partition.
    #[must_use]
    pub fn new(account: &AccountId, region: &AwsRegion) -> Self {
        Self {
            clusters: ResourceStore::new(account.clone(), region.clone()),
            task_definitions: ResourceStore::new(account.clone(), region.clone()),
        }
    }

    /// Drop every resource and revision counter.
    pub fn reset(&self) {
        self.clusters.reset();
        self.task_definitions.reset();
    }
}
