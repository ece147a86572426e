//! Core types, configuration, and state management for MockStack.
//!
//! This crate provides the building blocks shared by every emulated service:
//!
//! - AWS identity types ([`AccountId`], [`AwsRegion`]) and ARN synthesis ([`Arn`])
//! - Environment-driven configuration ([`MockStackConfig`])
//! - The generic, lock-guarded [`ResourceStore`] every service instantiates once
//!   per resource kind, with lifecycle, deletion-policy, and optimistic
//!   versioning semantics
//! - Per-(account, region) partitioning of service state ([`AccountRegionStore`])

mod arn;
mod config;
mod error;
mod state;
pub mod store;
mod types;

pub use arn::Arn;
pub use config::MockStackConfig;
pub use error::{ErrorKind, MockStackError, MockStackResult};
pub use state::AccountRegionStore;
pub use store::{
    Deletion, Identity, Lifecycle, Record, ResourceKind, ResourceStore, StoreError, StoreResult,
};
pub use types::{AccountId, AwsRegion};
