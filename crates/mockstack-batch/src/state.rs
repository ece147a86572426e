//! Batch resource kinds and per-partition state.

use std::collections::BTreeMap;

use mockstack_core::{AccountId, AwsRegion, Deletion, Lifecycle, ResourceKind, ResourceStore};

use crate::model::ComputeEnvironmentOrder;

/// Lifecycle status shared by compute environments and job queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Being provisioned.
    Creating,
    /// Being reconfigured.
    Updating,
    /// Being torn down.
    Deleting,
    /// Gone; visible only until purged.
    Deleted,
    /// Ready for use.
    Valid,
    /// Provisioning failed.
    Invalid,
}

impl Lifecycle for BatchStatus {
    fn initial() -> Self {
        Self::Creating
    }

    fn can_transition_to(self, next: Self) -> bool {
        use BatchStatus::{Creating, Deleted, Deleting, Invalid, Updating, Valid};
        matches!(
            (self, next),
            (Creating, Valid | Invalid)
                | (Valid | Invalid, Updating | Deleting)
                | (Updating, Valid | Invalid)
                | (Deleting, Deleted)
        )
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Deleting | Self::Deleted)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Creating => "CREATING",
            Self::Updating => "UPDATING",
            Self::Deleting => "DELETING",
            Self::Deleted => "DELETED",
            Self::Valid => "VALID",
            Self::Invalid => "INVALID",
        }
    }
}

/// `ENABLED` / `DISABLED` toggle of environments and queues.
pub const STATES: [&str; 2] = ["ENABLED", "DISABLED"];

/// A compute environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeEnvironment {
    /// `MANAGED` or `UNMANAGED`.
    pub ce_type: String,
    /// `ENABLED` or `DISABLED`.
    pub state: String,
    /// Opaque compute resource definition.
    pub compute_resources: Option<serde_json::Value>,
    /// IAM role Batch assumes.
    pub service_role: Option<String>,
    /// vCPUs of an unmanaged environment.
    pub unmanagedv_cpus: Option<i64>,
    /// ECS cluster backing the environment.
    pub ecs_cluster_arn: String,
    /// Unique id.
    pub uuid: String,
    /// Tags.
    pub tags: BTreeMap<String, String>,
}

impl ResourceKind for ComputeEnvironment {
    type Status = BatchStatus;

    const SERVICE: &'static str = "batch";
    const RESOURCE_TYPE: &'static str = "compute-environment";

    fn deletion() -> Deletion<BatchStatus> {
        Deletion::Erase
    }
}

/// A job queue.
#[derive(Debug, Clone, PartialEq)]
pub struct JobQueue {
    /// `ENABLED` or `DISABLED`.
    pub state: String,
    /// Scheduling priority.
    pub priority: i64,
    /// Environments in placement order, referenced by ARN.
    pub compute_environment_order: Vec<ComputeEnvironmentOrder>,
    /// Tags.
    pub tags: BTreeMap<String, String>,
}

impl ResourceKind for JobQueue {
    type Status = BatchStatus;

    const SERVICE: &'static str = "batch";
    const RESOURCE_TYPE: &'static str = "job-queue";

    /// Deleted queues stay describable as `DELETING` for a short while.
    fn deletion() -> Deletion<BatchStatus> {
        Deletion::Schedule {
            status: BatchStatus::Deleting,
            window: chrono::Duration::seconds(30),
        }
    }
}

/// Batch state of one (account, region) partition.
#[derive(Debug)]
pub struct BatchState {
    /// Compute environments keyed by name.
    pub compute_environments: ResourceStore<ComputeEnvironment>,
    /// Job queues keyed by name.
    pub job_queues: ResourceStore<JobQueue>,
}

impl BatchState {
    /// Create empty state for a partition.
    #[must_use]
    pub fn new(account: &AccountId, region: &AwsRegion) -> Self {
        Self {
            compute_environments: ResourceStore::new(account.clone(), region.clone()),
            job_queues: ResourceStore::new(account.clone(), region.clone()),
        }
    }

    /// Drop every resource.
    pub fn reset(&self) {
        self.compute_environments.reset();
        self.job_queues.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_walk_create_update_delete_lifecycle() {
        use BatchStatus::{Creating, Deleted, Deleting, Updating, Valid};
        assert!(Creating.can_transition_to(Valid));
        assert!(Valid.can_transition_to(Updating));
        assert!(Updating.can_transition_to(Valid));
        assert!(Valid.can_transition_to(Deleting));
        assert!(Deleting.can_transition_to(Deleted));
        assert!(!Creating.can_transition_to(Deleted));
        assert!(!Deleted.can_transition_to(Valid));
        assert!(Deleting.is_terminal());
    }

    #[test]
    fn test_should_keep_deleted_queue_visible_as_deleting() {
        let state = BatchState::new(&AccountId::default(), &AwsRegion::default());
        state
            .job_queues
            .create("q1", |_| JobQueue {
                state: "ENABLED".to_owned(),
                priority: 1,
                compute_environment_order: Vec::new(),
                tags: BTreeMap::new(),
            })
            .unwrap();
        state.job_queues.transition("q1", BatchStatus::Valid).unwrap();

        let deleted = state.job_queues.delete("q1").unwrap();
        assert_eq!(deleted.status, BatchStatus::Deleting);
        assert!(deleted.deletion_date.is_some());
        assert_eq!(state.job_queues.get("q1").unwrap().status, BatchStatus::Deleting);
    }
}
