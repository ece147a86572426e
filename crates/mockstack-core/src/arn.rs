//! Amazon Resource Name synthesis and parsing.

use std::fmt;

use crate::types::{AccountId, AwsRegion};

/// A synthesized ARN: `arn:<partition>:<service>:<region>:<account>:<resource>`.
///
/// The resource part is opaque here. Each resource kind decides its own
/// layout (`compute-environment/ce1`, `task-definition/web:3`, or a bare
/// topic name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arn {
    partition: String,
    service: String,
    region: String,
    account: String,
    resource: String,
}

impl Arn {
    /// Partition used for every synthesized ARN.
    pub const PARTITION: &str = "aws";

    /// Build an ARN in the `aws` partition.
    #[must_use]
    pub fn new(
        service: &str,
        region: &AwsRegion,
        account: &AccountId,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            partition: Self::PARTITION.to_owned(),
            service: service.to_owned(),
            region: region.as_str().to_owned(),
            account: account.as_str().to_owned(),
            resource: resource.into(),
        }
    }

    /// Parse an ARN string. Returns `None` unless it has all six fields.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.splitn(6, ':');
        if parts.next()? != "arn" {
            return None;
        }
        let partition = parts.next()?;
        let service = parts.next()?;
        let region = parts.next()?;
        let account = parts.next()?;
        let resource = parts.next()?;
        if partition.is_empty() || service.is_empty() || resource.is_empty() {
            return None;
        }
        Some(Self {
            partition: partition.to_owned(),
            service: service.to_owned(),
            region: region.to_owned(),
            account: account.to_owned(),
            resource: resource.to_owned(),
        })
    }

    /// The service segment (e.g. `batch`).
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The region segment.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The account segment.
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    /// The resource segment, including any resource-type prefix.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The resource identifier with any `type/` prefix removed.
    #[must_use]
    pub fn resource_id(&self) -> &str {
        self.resource
            .split_once('/')
            .map_or(self.resource.as_str(), |(_, id)| id)
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account, self.resource
        )
    }
}
