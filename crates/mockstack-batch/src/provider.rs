//! Batch provider implementing all operations.

use std::collections::BTreeMap;
use std::sync::Arc;

use mockstack_core::{
    AccountRegionStore, Arn, Lifecycle, Record, ResourceKind, ResourceStore, StoreError,
};
use mockstack_gateway::{RequestContext, ServiceError};

use crate::error::{CLIENT_EXCEPTION, client, not_found, store_error_to_batch};
use crate::model::{
    ComputeEnvironmentDetail, ComputeEnvironmentOrder, ComputeEnvironmentOutput,
    CreateComputeEnvironmentInput, CreateJobQueueInput, DeleteComputeEnvironmentInput,
    DeleteJobQueueInput, DescribeComputeEnvironmentsInput, DescribeComputeEnvironmentsOutput,
    DescribeJobQueuesInput, DescribeJobQueuesOutput, JobQueueDetail, JobQueueOutput,
    ListTagsForResourceOutput, TagResourceInput, UpdateComputeEnvironmentInput,
    UpdateJobQueueInput,
};
use crate::state::{BatchState, BatchStatus, ComputeEnvironment, JobQueue, STATES};

/// Default and largest page size of describe operations.
const DEFAULT_MAX_RESULTS: usize = 100;
const MAX_RESULTS_LIMIT: usize = 1000;

/// Longest resource name.
const MAX_NAME_LEN: usize = 128;

/// Most environments a job queue may reference.
const MAX_QUEUE_ENVIRONMENTS: usize = 3;

/// Most tags on one resource.
const MAX_TAGS: usize = 50;

/// Main Batch provider.
#[derive(Debug, Default)]
pub struct MockStackBatch {
    state: AccountRegionStore<BatchState>,
}

impl MockStackBatch {
    /// Create a provider with no resources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self, ctx: &RequestContext) -> Arc<BatchState> {
        self.state
            .get_or_create_with(&ctx.account, &ctx.region, BatchState::new)
    }

    /// Reset all state (for testing).
    pub fn reset(&self) {
        self.state.reset();
    }
}

// ---------------------------------------------------------------------------
// Compute environments
// ---------------------------------------------------------------------------

impl MockStackBatch {
    /// Handle `CreateComputeEnvironment`.
    ///
    /// Provisioning is instantaneous: the environment is `VALID` by the time
    /// the call returns.
    pub fn handle_create_compute_environment(
        &self,
        ctx: &RequestContext,
        input: CreateComputeEnvironmentInput,
    ) -> Result<ComputeEnvironmentOutput, ServiceError> {
        let name = input.compute_environment_name;
        validate_name(&name, "computeEnvironmentName")?;

        let ce_type = input.ce_type.to_ascii_uppercase();
        if ce_type != "MANAGED" && ce_type != "UNMANAGED" {
            return Err(client(format!(
                "Invalid value for type: '{}'. Must be MANAGED or UNMANAGED",
                input.ce_type
            )));
        }
        if ce_type == "UNMANAGED" && input.compute_resources.is_some() {
            return Err(client(
                "computeResources can only be specified for MANAGED compute environments",
            ));
        }
        let state = validate_state(input.state.as_deref())?.unwrap_or("ENABLED");
        validate_tags(&input.tags)?;

        let uuid = uuid::Uuid::new_v4().to_string();
        let ecs_cluster_arn = Arn::new(
            "ecs",
            &ctx.region,
            &ctx.account,
            format!("cluster/{name}_Batch_{uuid}"),
        )
        .to_string();

        let store = self.state(ctx);
        let record = store
            .compute_environments
            .create_in_status(&name, BatchStatus::Valid, |_| ComputeEnvironment {
                ce_type,
                state: state.to_owned(),
                compute_resources: input.compute_resources,
                service_role: input.service_role,
                unmanagedv_cpus: input.unmanagedv_cpus,
                ecs_cluster_arn,
                uuid,
                tags: input.tags,
            })
            .map_err(store_error_to_batch)?;

        tracing::debug!(name = %name, arn = %record.arn, "created compute environment");
        Ok(ComputeEnvironmentOutput {
            compute_environment_name: name,
            compute_environment_arn: record.arn,
        })
    }

    /// Handle `DescribeComputeEnvironments`.
    ///
    /// Names and ARNs may be mixed; missing ones are skipped. Without a list
    /// every environment is returned, one page at a time.
    pub fn handle_describe_compute_environments(
        &self,
        ctx: &RequestContext,
        input: &DescribeComputeEnvironmentsInput,
    ) -> Result<DescribeComputeEnvironmentsOutput, ServiceError> {
        let store = self.state(ctx);
        let keys: Vec<String> = input
            .compute_environments
            .iter()
            .map(|s| resource_key(s))
            .collect();
        let details: Vec<ComputeEnvironmentDetail> = store
            .compute_environments
            .list(&keys)
            .iter()
            .map(compute_environment_detail)
            .collect();

        let (compute_environments, next_token) =
            paginate(details, input.max_results, input.next_token.as_deref())?;
        Ok(DescribeComputeEnvironmentsOutput {
            compute_environments,
            next_token,
        })
    }

    /// Handle `UpdateComputeEnvironment`.
    pub fn handle_update_compute_environment(
        &self,
        ctx: &RequestContext,
        input: UpdateComputeEnvironmentInput,
    ) -> Result<ComputeEnvironmentOutput, ServiceError> {
        let key = resource_key(&input.compute_environment);
        let state = validate_state(input.state.as_deref())?;

        let store = self.state(ctx);
        let current = store
            .compute_environments
            .get(&key)
            .map_err(store_error_to_batch)?;
        if current.payload.ce_type == "UNMANAGED" && input.compute_resources.is_some() {
            return Err(client(
                "computeResources can only be specified for MANAGED compute environments",
            ));
        }

        let record = store
            .compute_environments
            .update(&key, None, |ce| {
                if let Some(state) = state {
                    state.clone_into(&mut ce.state);
                }
                if let Some(resources) = input.compute_resources {
                    ce.compute_resources = Some(resources);
                }
                if let Some(role) = input.service_role {
                    ce.service_role = Some(role);
                }
                if let Some(cpus) = input.unmanagedv_cpus {
                    ce.unmanagedv_cpus = Some(cpus);
                }
                Ok::<(), StoreError>(())
            })
            .map_err(store_error_to_batch)?;

        tracing::debug!(name = %key, "updated compute environment");
        Ok(ComputeEnvironmentOutput {
            compute_environment_name: record.key,
            compute_environment_arn: record.arn,
        })
    }

    /// Handle `DeleteComputeEnvironment`.
    ///
    /// An environment still referenced by a job queue cannot be deleted.
    pub fn handle_delete_compute_environment(
        &self,
        ctx: &RequestContext,
        input: &DeleteComputeEnvironmentInput,
    ) -> Result<(), ServiceError> {
        let key = resource_key(&input.compute_environment);
        let store = self.state(ctx);

        let arn = store.compute_environments.arn_for(&key);
        let in_use = store
            .job_queues
            .list::<&str>(&[])
            .iter()
            .filter(|q| !q.is_terminal())
            .any(|q| {
                q.payload
                    .compute_environment_order
                    .iter()
                    .any(|o| o.compute_environment == arn)
            });
        if in_use {
            return Err(client(format!(
                "Cannot delete, found existing JobQueue relationship for {key}"
            )));
        }

        store
            .compute_environments
            .delete(&key)
            .map_err(store_error_to_batch)?;
        tracing::debug!(name = %key, "deleted compute environment");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Job queues
// ---------------------------------------------------------------------------

impl MockStackBatch {
    /// Handle `CreateJobQueue`.
    pub fn handle_create_job_queue(
        &self,
        ctx: &RequestContext,
        input: CreateJobQueueInput,
    ) -> Result<JobQueueOutput, ServiceError> {
        let name = input.job_queue_name;
        validate_name(&name, "jobQueueName")?;
        let priority = input
            .priority
            .ok_or_else(|| client("priority is required"))?;
        let state = validate_state(input.state.as_deref())?.unwrap_or("ENABLED");
        validate_tags(&input.tags)?;

        let store = self.state(ctx);
        let order = resolve_environment_order(&store, input.compute_environment_order)?;

        let record = store
            .job_queues
            .create_in_status(&name, BatchStatus::Valid, |_| JobQueue {
                state: state.to_owned(),
                priority,
                compute_environment_order: order,
                tags: input.tags,
            })
            .map_err(store_error_to_batch)?;

        tracing::debug!(name = %name, arn = %record.arn, "created job queue");
        Ok(JobQueueOutput {
            job_queue_name: name,
            job_queue_arn: record.arn,
        })
    }

    /// Handle `DescribeJobQueues`.
    pub fn handle_describe_job_queues(
        &self,
        ctx: &RequestContext,
        input: &DescribeJobQueuesInput,
    ) -> Result<DescribeJobQueuesOutput, ServiceError> {
        let store = self.state(ctx);
        let keys: Vec<String> = input.job_queues.iter().map(|s| resource_key(s)).collect();
        let details: Vec<JobQueueDetail> = store
            .job_queues
            .list(&keys)
            .iter()
            .map(job_queue_detail)
            .collect();

        let (job_queues, next_token) =
            paginate(details, input.max_results, input.next_token.as_deref())?;
        Ok(DescribeJobQueuesOutput {
            job_queues,
            next_token,
        })
    }

    /// Handle `UpdateJobQueue`.
    pub fn handle_update_job_queue(
        &self,
        ctx: &RequestContext,
        input: UpdateJobQueueInput,
    ) -> Result<JobQueueOutput, ServiceError> {
        let key = resource_key(&input.job_queue);
        let state = validate_state(input.state.as_deref())?;

        let store = self.state(ctx);
        let order = input
            .compute_environment_order
            .map(|order| resolve_environment_order(&store, order))
            .transpose()?;

        let record = store
            .job_queues
            .update(&key, None, |queue| {
                if let Some(state) = state {
                    state.clone_into(&mut queue.state);
                }
                if let Some(priority) = input.priority {
                    queue.priority = priority;
                }
                if let Some(order) = order {
                    queue.compute_environment_order = order;
                }
                Ok::<(), StoreError>(())
            })
            .map_err(store_error_to_batch)?;

        tracing::debug!(name = %key, "updated job queue");
        Ok(JobQueueOutput {
            job_queue_name: record.key,
            job_queue_arn: record.arn,
        })
    }

    /// Handle `DeleteJobQueue`. The queue stays describable as `DELETING`
    /// until it is purged.
    pub fn handle_delete_job_queue(
        &self,
        ctx: &RequestContext,
        input: &DeleteJobQueueInput,
    ) -> Result<(), ServiceError> {
        let key = resource_key(&input.job_queue);
        self.state(ctx)
            .job_queues
            .delete(&key)
            .map_err(store_error_to_batch)?;
        tracing::debug!(name = %key, "deleted job queue");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Resource kinds that carry tags.
trait Tagged: ResourceKind {
    fn tags(&self) -> &BTreeMap<String, String>;
    fn tags_mut(&mut self) -> &mut BTreeMap<String, String>;
}

impl Tagged for ComputeEnvironment {
    fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    fn tags_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.tags
    }
}

impl Tagged for JobQueue {
    fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    fn tags_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.tags
    }
}

/// A taggable resource named by ARN.
enum TagTarget {
    ComputeEnvironment(String),
    JobQueue(String),
}

impl TagTarget {
    fn parse(resource_arn: &str) -> Result<Self, ServiceError> {
        let arn = Arn::parse(resource_arn)
            .filter(|arn| arn.service() == "batch")
            .ok_or_else(|| client(format!("Invalid resource ARN: {resource_arn}")))?;
        match arn.resource().split_once('/') {
            Some(("compute-environment", name)) => {
                Ok(Self::ComputeEnvironment(name.to_owned()))
            }
            Some(("job-queue", name)) => Ok(Self::JobQueue(name.to_owned())),
            _ => Err(client(format!(
                "Tagging is not supported for resource {resource_arn}"
            ))),
        }
    }
}

impl MockStackBatch {
    /// Handle `TagResource`. Existing keys are overwritten.
    pub fn handle_tag_resource(
        &self,
        ctx: &RequestContext,
        resource_arn: &str,
        input: TagResourceInput,
    ) -> Result<(), ServiceError> {
        let store = self.state(ctx);
        let tags = input.tags;
        match TagTarget::parse(resource_arn)? {
            TagTarget::ComputeEnvironment(name) => {
                add_tags(&store.compute_environments, &name, tags)
            }
            TagTarget::JobQueue(name) => add_tags(&store.job_queues, &name, tags),
        }
    }

    /// Handle `ListTagsForResource`.
    pub fn handle_list_tags_for_resource(
        &self,
        ctx: &RequestContext,
        resource_arn: &str,
    ) -> Result<ListTagsForResourceOutput, ServiceError> {
        let store = self.state(ctx);
        let tags = match TagTarget::parse(resource_arn)? {
            TagTarget::ComputeEnvironment(name) => current_tags(&store.compute_environments, &name),
            TagTarget::JobQueue(name) => current_tags(&store.job_queues, &name),
        }?;
        Ok(ListTagsForResourceOutput { tags })
    }

    /// Handle `UntagResource`. Keys the resource doesn't carry are ignored.
    pub fn handle_untag_resource(
        &self,
        ctx: &RequestContext,
        resource_arn: &str,
        tag_keys: &[String],
    ) -> Result<(), ServiceError> {
        if tag_keys.is_empty() {
            return Err(client("tagKeys is required"));
        }
        let store = self.state(ctx);
        match TagTarget::parse(resource_arn)? {
            TagTarget::ComputeEnvironment(name) => {
                remove_tags(&store.compute_environments, &name, tag_keys)
            }
            TagTarget::JobQueue(name) => remove_tags(&store.job_queues, &name, tag_keys),
        }
    }
}

fn add_tags<T: Tagged>(
    store: &ResourceStore<T>,
    key: &str,
    tags: BTreeMap<String, String>,
) -> Result<(), ServiceError> {
    validate_tags(&tags)?;
    store.update(key, None, |resource| {
        resource.tags_mut().extend(tags);
        if resource.tags().len() > MAX_TAGS {
            return Err(client(format!("A resource can have at most {MAX_TAGS} tags")));
        }
        Ok(())
    })
    .map_err(|err| err.with_code(CLIENT_EXCEPTION))?;
    Ok(())
}

fn current_tags<T: Tagged>(
    store: &ResourceStore<T>,
    key: &str,
) -> Result<BTreeMap<String, String>, ServiceError> {
    let record = store.get(key).map_err(store_error_to_batch)?;
    Ok(record.payload.tags().clone())
}

fn remove_tags<T: Tagged>(
    store: &ResourceStore<T>,
    key: &str,
    tag_keys: &[String],
) -> Result<(), ServiceError> {
    store
        .update(key, None, |resource| {
            let tags = resource.tags_mut();
            for k in tag_keys {
                tags.remove(k);
            }
            Ok::<(), StoreError>(())
        })
        .map_err(store_error_to_batch)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Store key named by a resource name or ARN.
fn resource_key(name_or_arn: &str) -> String {
    Arn::parse(name_or_arn).map_or_else(
        || name_or_arn.to_owned(),
        |arn| arn.resource_id().to_owned(),
    )
}

fn validate_name(name: &str, field: &str) -> Result<(), ServiceError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(client(format!(
            "{field} must be 1 to {MAX_NAME_LEN} letters, numbers, hyphens, or underscores"
        )))
    }
}

fn validate_state(state: Option<&str>) -> Result<Option<&'static str>, ServiceError> {
    state
        .map(|s| {
            STATES
                .into_iter()
                .find(|known| *known == s)
                .ok_or_else(|| client(format!("Invalid value for state: '{s}'")))
        })
        .transpose()
}

fn validate_tags(tags: &BTreeMap<String, String>) -> Result<(), ServiceError> {
    if tags.len() > MAX_TAGS {
        return Err(client(format!("A resource can have at most {MAX_TAGS} tags")));
    }
    if let Some(key) = tags.keys().find(|k| k.is_empty() || k.len() > 128) {
        return Err(client(format!("Invalid tag key: '{key}'")));
    }
    Ok(())
}

/// Check that every referenced environment exists and store it by ARN.
fn resolve_environment_order(
    store: &BatchState,
    order: Vec<ComputeEnvironmentOrder>,
) -> Result<Vec<ComputeEnvironmentOrder>, ServiceError> {
    if order.is_empty() {
        return Err(client("computeEnvironmentOrder must not be empty"));
    }
    if order.len() > MAX_QUEUE_ENVIRONMENTS {
        return Err(client(format!(
            "A job queue can reference at most {MAX_QUEUE_ENVIRONMENTS} compute environments"
        )));
    }

    let mut resolved = order
        .into_iter()
        .map(|entry| {
            let record = store
                .compute_environments
                .get(&resource_key(&entry.compute_environment))
                .map_err(|_| {
                    not_found(format!(
                        "computeEnvironment {} does not exist",
                        entry.compute_environment
                    ))
                })?;
            Ok(ComputeEnvironmentOrder {
                order: entry.order,
                compute_environment: record.arn,
            })
        })
        .collect::<Result<Vec<_>, ServiceError>>()?;
    resolved.sort_by_key(|entry| entry.order);
    Ok(resolved)
}

fn compute_environment_detail(record: &Record<ComputeEnvironment>) -> ComputeEnvironmentDetail {
    let ce = &record.payload;
    ComputeEnvironmentDetail {
        compute_environment_name: record.key.clone(),
        compute_environment_arn: record.arn.clone(),
        ecs_cluster_arn: ce.ecs_cluster_arn.clone(),
        tags: ce.tags.clone(),
        ce_type: ce.ce_type.clone(),
        state: ce.state.clone(),
        status: record.status.as_str().to_owned(),
        status_reason: status_reason(record.status).to_owned(),
        compute_resources: ce.compute_resources.clone(),
        service_role: ce.service_role.clone(),
        unmanagedv_cpus: ce.unmanagedv_cpus,
        uuid: ce.uuid.clone(),
        container_orchestration_type: "ECS",
    }
}

fn job_queue_detail(record: &Record<JobQueue>) -> JobQueueDetail {
    let queue = &record.payload;
    JobQueueDetail {
        job_queue_name: record.key.clone(),
        job_queue_arn: record.arn.clone(),
        state: queue.state.clone(),
        status: record.status.as_str().to_owned(),
        status_reason: status_reason(record.status).to_owned(),
        priority: queue.priority,
        compute_environment_order: queue.compute_environment_order.clone(),
        tags: queue.tags.clone(),
    }
}

fn status_reason(status: BatchStatus) -> &'static str {
    match status {
        BatchStatus::Valid => "Resource is valid",
        BatchStatus::Invalid => "Resource is invalid",
        BatchStatus::Creating => "Resource is being created",
        BatchStatus::Updating => "Resource is being updated",
        BatchStatus::Deleting => "Resource is being deleted",
        BatchStatus::Deleted => "Resource is deleted",
    }
}

fn paginate<T>(
    items: Vec<T>,
    max_results: Option<usize>,
    token: Option<&str>,
) -> Result<(Vec<T>, Option<String>), ServiceError> {
    let size = match max_results {
        None => DEFAULT_MAX_RESULTS,
        Some(n) if (1..=MAX_RESULTS_LIMIT).contains(&n) => n,
        Some(n) => {
            return Err(client(format!(
                "maxResults must be between 1 and {MAX_RESULTS_LIMIT}, got {n}"
            )));
        }
    };
    let start = match token {
        Some(t) => t
            .parse::<usize>()
            .map_err(|_| client(format!("Invalid nextToken: {t}")))?,
        None => 0,
    };
    let end = start.saturating_add(size);
    let next = (items.len() > end).then(|| end.to_string());
    let page = items.into_iter().skip(start).take(size).collect();
    Ok((page, next))
}
