//! ECS operation enum.

use std::fmt;

/// All supported ECS operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcsOperation {
    // Clusters
    /// Create a cluster, or return the existing one.
    CreateCluster,
    /// Describe clusters by name or ARN.
    DescribeClusters,
    /// List active cluster ARNs.
    ListClusters,
    /// Mark a cluster inactive.
    DeleteCluster,
    /// Replace cluster settings.
    UpdateClusterSettings,

    // Task definitions
    /// Register a new revision of a task definition family.
    RegisterTaskDefinition,
    /// Describe one task definition revision.
    DescribeTaskDefinition,
    /// Mark a revision inactive.
    DeregisterTaskDefinition,
    /// List task definition ARNs.
    ListTaskDefinitions,
}

impl EcsOperation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::CreateCluster,
        Self::DescribeClusters,
        Self::ListClusters,
        Self::DeleteCluster,
        Self::UpdateClusterSettings,
        Self::RegisterTaskDefinition,
        Self::DescribeTaskDefinition,
        Self::DeregisterTaskDefinition,
        Self::ListTaskDefinitions,
    ];

    /// Returns the AWS operation name string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateCluster => "CreateCluster",
            Self::DescribeClusters => "DescribeClusters",
            Self::ListClusters => "ListClusters",
            Self::DeleteCluster => "DeleteCluster",
            Self::UpdateClusterSettings => "UpdateClusterSettings",
            Self::RegisterTaskDefinition => "RegisterTaskDefinition",
            Self::DescribeTaskDefinition => "DescribeTaskDefinition",
            Self::DeregisterTaskDefinition => "DeregisterTaskDefinition",
            Self::ListTaskDefinitions => "ListTaskDefinitions",
        }
    }

    /// Parse an operation name string into an `EcsOperation`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }
}

impl fmt::Display for EcsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
