//! Batch operation enum and REST routes.

use std::fmt;

use http::Method;

/// All supported Batch operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchOperation {
    // Compute environments
    /// Create a compute environment.
    CreateComputeEnvironment,
    /// Describe compute environments by name or ARN.
    DescribeComputeEnvironments,
    /// Change the state or resources of a compute environment.
    UpdateComputeEnvironment,
    /// Delete a compute environment.
    DeleteComputeEnvironment,

    // Job queues
    /// Create a job queue.
    CreateJobQueue,
    /// Describe job queues by name or ARN.
    DescribeJobQueues,
    /// Change the state, priority, or environments of a job queue.
    UpdateJobQueue,
    /// Delete a job queue.
    DeleteJobQueue,

    // Tags
    /// Add tags to a resource.
    TagResource,
    /// List the tags of a resource.
    ListTagsForResource,
    /// Remove tags from a resource.
    UntagResource,
}

impl BatchOperation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::CreateComputeEnvironment,
        Self::DescribeComputeEnvironments,
        Self::UpdateComputeEnvironment,
        Self::DeleteComputeEnvironment,
        Self::CreateJobQueue,
        Self::DescribeJobQueues,
        Self::UpdateJobQueue,
        Self::DeleteJobQueue,
        Self::TagResource,
        Self::ListTagsForResource,
        Self::UntagResource,
    ];

    /// Returns the AWS operation name string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateComputeEnvironment => "CreateComputeEnvironment",
            Self::DescribeComputeEnvironments => "DescribeComputeEnvironments",
            Self::UpdateComputeEnvironment => "UpdateComputeEnvironment",
            Self::DeleteComputeEnvironment => "DeleteComputeEnvironment",
            Self::CreateJobQueue => "CreateJobQueue",
            Self::DescribeJobQueues => "DescribeJobQueues",
            Self::UpdateJobQueue => "UpdateJobQueue",
            Self::DeleteJobQueue => "DeleteJobQueue",
            Self::TagResource => "TagResource",
            Self::ListTagsForResource => "ListTagsForResource",
            Self::UntagResource => "UntagResource",
        }
    }

    /// Parse an operation name string into a `BatchOperation`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    /// HTTP method and path template of the operation.
    #[must_use]
    pub fn route(&self) -> (Method, &'static str) {
        match self {
            Self::CreateComputeEnvironment => (Method::POST, "/v1/createcomputeenvironment"),
            Self::DescribeComputeEnvironments => (Method::POST, "/v1/describecomputeenvironments"),
            Self::UpdateComputeEnvironment => (Method::POST, "/v1/updatecomputeenvironment"),
            Self::DeleteComputeEnvironment => (Method::POST, "/v1/deletecomputeenvironment"),
            Self::CreateJobQueue => (Method::POST, "/v1/createjobqueue"),
            Self::DescribeJobQueues => (Method::POST, "/v1/describejobqueues"),
            Self::UpdateJobQueue => (Method::POST, "/v1/updatejobqueue"),
            Self::DeleteJobQueue => (Method::POST, "/v1/deletejobqueue"),
            Self::TagResource => (Method::POST, "/v1/tags/{resourceArn}"),
            Self::ListTagsForResource => (Method::GET, "/v1/tags/{resourceArn}"),
            Self::UntagResource => (Method::DELETE, "/v1/tags/{resourceArn}"),
        }
    }
}

impl fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
