//! ECS provider implementing all operations.

use std::sync::Arc;

use mockstack_core::{AccountRegionStore, Arn, Lifecycle, Record, StoreError};
use mockstack_gateway::{RequestContext, ServiceError};

use crate::error::{client, cluster_store_error, invalid_parameter, task_definition_store_error};
use crate::model::{
    Cluster, ClusterOutput, ClusterSetting, CreateClusterInput, DeleteClusterInput,
    DeregisterTaskDefinitionInput, DescribeClustersInput, DescribeClustersOutput,
    DescribeTaskDefinitionInput, Failure, ListClustersInput, ListClustersOutput,
    ListTaskDefinitionsInput, ListTaskDefinitionsOutput, RegisterTaskDefinitionInput,
    TaskDefinition, TaskDefinitionOutput, UpdateClusterSettingsInput,
};
use crate::state::{ClusterData, EcsState, EcsStatus, TaskDefinitionData};

/// Cluster used when a request names none.
const DEFAULT_CLUSTER: &str = "default";

/// Default and largest page size of list operations.
const DEFAULT_MAX_RESULTS: usize = 100;

/// Longest cluster or family name.
const MAX_NAME_LEN: usize = 255;

/// Most clusters one `DescribeClusters` call may name.
const MAX_DESCRIBE_CLUSTERS: usize = 100;

/// Values accepted for the `containerInsights` setting.
const CONTAINER_INSIGHTS_VALUES: [&str; 3] = ["enabled", "disabled", "enhanced"];

/// Main ECS provider.
#[derive(Debug, Default)]
pub struct MockStackEcs {
    state: AccountRegionStore<EcsState>,
}

impl MockStackEcs {
    /// Create a provider with no clusters or task definitions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self, ctx: &RequestContext) -> Arc<EcsState> {
        self.state
            .get_or_create_with(&ctx.account, &ctx.region, EcsState::new)
    }

    /// Reset all state (for testing).
    pub fn reset(&self) {
        self.state.reset();
    }
}

// ---------------------------------------------------------------------------
// Clusters
// ---------------------------------------------------------------------------

impl MockStackEcs {
    /// Handle `CreateCluster`.
    ///
    /// Creating a cluster that is already active returns it as is. An
    /// inactive cluster of the same name is replaced.
    pub fn handle_create_cluster(
        &self,
        ctx: &RequestContext,
        input: CreateClusterInput,
    ) -> Result<ClusterOutput, ServiceError> {
        let name = input
            .cluster_name
            .unwrap_or_else(|| DEFAULT_CLUSTER.to_owned());
        validate_name(&name, "clusterName")?;
        validate_settings(&input.settings)?;

        let (record, created) = self
            .state(ctx)
            .clusters
            .create_idempotent(&name, |_| ClusterData {
                settings: input.settings,
                capacity_providers: input.capacity_providers,
                tags: input.tags,
            })
            .map_err(cluster_store_error)?;

        if created {
            tracing::debug!(name = %name, arn = %record.arn, "created cluster");
        }
        Ok(ClusterOutput {
            cluster: cluster_view(&record, true),
        })
    }

    /// Handle `DescribeClusters`.
    ///
    /// Unknown clusters are reported under `failures` with reason `MISSING`
    /// rather than failing the call.
    pub fn handle_describe_clusters(
        &self,
        ctx: &RequestContext,
        input: &DescribeClustersInput,
    ) -> Result<DescribeClustersOutput, ServiceError> {
        if input.clusters.len() > MAX_DESCRIBE_CLUSTERS {
            return Err(invalid_parameter(format!(
                "At most {MAX_DESCRIBE_CLUSTERS} clusters can be described at once"
            )));
        }
        let include_tags = input.include.iter().any(|i| i == "TAGS");
        let requested: Vec<String> = if input.clusters.is_empty() {
            vec![DEFAULT_CLUSTER.to_owned()]
        } else {
            input.clusters.iter().map(|c| resource_key(c)).collect()
        };

        let state = self.state(ctx);
        let mut clusters = Vec::new();
        let mut failures = Vec::new();
        for key in &requested {
            match state.clusters.get(key) {
                Ok(record) => clusters.push(cluster_view(&record, include_tags)),
                Err(_) => failures.push(Failure {
                    arn: state.clusters.arn_for(key),
                    reason: "MISSING".to_owned(),
                }),
            }
        }
        Ok(DescribeClustersOutput { clusters, failures })
    }

    /// Handle `ListClusters`. Inactive clusters are left out.
    pub fn handle_list_clusters(
        &self,
        ctx: &RequestContext,
        input: &ListClustersInput,
    ) -> Result<ListClustersOutput, ServiceError> {
        let arns: Vec<String> = self
            .state(ctx)
            .clusters
            .list::<&str>(&[])
            .into_iter()
            .filter(|r| !r.is_terminal())
            .map(|r| r.arn)
            .collect();

        let (cluster_arns, next_token) =
            paginate(arns, input.max_results, input.next_token.as_deref())?;
        Ok(ListClustersOutput {
            cluster_arns,
            next_token,
        })
    }

    /// Handle `DeleteCluster`. The cluster stays describable as `INACTIVE`.
    pub fn handle_delete_cluster(
        &self,
        ctx: &RequestContext,
        input: &DeleteClusterInput,
    ) -> Result<ClusterOutput, ServiceError> {
        let key = resource_key(&input.cluster);
        let record = self
            .state(ctx)
            .clusters
            .delete(&key)
            .map_err(cluster_store_error)?;

        tracing::debug!(name = %key, "deleted cluster");
        Ok(ClusterOutput {
            cluster: cluster_view(&record, true),
        })
    }

    /// Handle `UpdateClusterSettings`.
    ///
    /// Settings named in the request replace the stored ones of the same name.
    /// The write is guarded by the version read at the start of the call, so a
    /// concurrent update surfaces as `UpdateInProgressException`.
    pub fn handle_update_cluster_settings(
        &self,
        ctx: &RequestContext,
        input: UpdateClusterSettingsInput,
    ) -> Result<ClusterOutput, ServiceError> {
        if input.settings.is_empty() {
            return Err(invalid_parameter("settings must not be empty"));
        }
        validate_settings(&input.settings)?;

        let key = resource_key(&input.cluster);
        let state = self.state(ctx);
        let current = state.clusters.get(&key).map_err(cluster_store_error)?;

        let record = state
            .clusters
            .update(&key, current.version, |cluster| {
                for setting in input.settings {
                    match cluster.settings.iter_mut().find(|s| s.name == setting.name) {
                        Some(existing) => existing.value = setting.value,
                        None => cluster.settings.push(setting),
                    }
                }
                Ok::<(), StoreError>(())
            })
            .map_err(cluster_store_error)?;

        tracing::debug!(name = %key, version = ?record.version, "updated cluster settings");
        Ok(ClusterOutput {
            cluster: cluster_view(&record, true),
        })
    }
}

// ---------------------------------------------------------------------------
// Task definitions
// ---------------------------------------------------------------------------

impl MockStackEcs {
    /// Handle `RegisterTaskDefinition`. Each call adds the next revision of
    /// the family.
    pub fn handle_register_task_definition(
        &self,
        ctx: &RequestContext,
        input: RegisterTaskDefinitionInput,
    ) -> Result<TaskDefinitionOutput, ServiceError> {
        validate_name(&input.family, "family")?;
        if input.container_definitions.is_empty() {
            return Err(client("Container list cannot be empty."));
        }

        let tags = input.tags.clone();
        let family = input.family.clone();
        let record = self
            .state(ctx)
            .task_definitions
            .create_revision(&family, |_, revision| TaskDefinitionData {
                family: input.family,
                revision,
                container_definitions: input.container_definitions,
                volumes: input.volumes,
                task_role_arn: input.task_role_arn,
                execution_role_arn: input.execution_role_arn,
                network_mode: input.network_mode,
                requires_compatibilities: input.requires_compatibilities,
                cpu: input.cpu,
                memory: input.memory,
                tags: input.tags,
            });

        tracing::debug!(
            family = %family,
            revision = record.payload.revision,
            "registered task definition"
        );
        Ok(TaskDefinitionOutput {
            task_definition: task_definition_view(&record),
            tags,
        })
    }

    /// Handle `DescribeTaskDefinition`.
    ///
    /// A bare family resolves to its latest `ACTIVE` revision; an explicit
    /// revision may be inactive.
    pub fn handle_describe_task_definition(
        &self,
        ctx: &RequestContext,
        input: &DescribeTaskDefinitionInput,
    ) -> Result<TaskDefinitionOutput, ServiceError> {
        let state = self.state(ctx);
        let record = match parse_task_definition(&input.task_definition)? {
            TaskDefinitionRef::Revision(key) => state
                .task_definitions
                .get(&key)
                .map_err(task_definition_store_error)?,
            TaskDefinitionRef::Family(family) => {
                latest_active_revision(&state, &family).ok_or_else(|| {
                    client("Unable to describe task definition.")
                })?
            }
        };

        let include_tags = input.include.iter().any(|i| i == "TAGS");
        Ok(TaskDefinitionOutput {
            task_definition: task_definition_view(&record),
            tags: if include_tags {
                record.payload.tags.clone()
            } else {
                Vec::new()
            },
        })
    }

    /// Handle `DeregisterTaskDefinition`. Requires an explicit revision.
    pub fn handle_deregister_task_definition(
        &self,
        ctx: &RequestContext,
        input: &DeregisterTaskDefinitionInput,
    ) -> Result<TaskDefinitionOutput, ServiceError> {
        let TaskDefinitionRef::Revision(key) = parse_task_definition(&input.task_definition)?
        else {
            return Err(client("Invalid revision number. Number: latest"));
        };

        let record = self
            .state(ctx)
            .task_definitions
            .delete(&key)
            .map_err(task_definition_store_error)?;

        tracing::debug!(task_definition = %key, "deregistered task definition");
        Ok(TaskDefinitionOutput {
            task_definition: task_definition_view(&record),
            tags: Vec::new(),
        })
    }

    /// Handle `ListTaskDefinitions`.
    ///
    /// Revisions are ordered by family, then numerically by revision.
    pub fn handle_list_task_definitions(
        &self,
        ctx: &RequestContext,
        input: &ListTaskDefinitionsInput,
    ) -> Result<ListTaskDefinitionsOutput, ServiceError> {
        let status = match input.status.as_deref() {
            None | Some("ACTIVE") => EcsStatus::Active,
            Some("INACTIVE") => EcsStatus::Inactive,
            Some(other) => {
                return Err(invalid_parameter(format!("Invalid status: {other}")));
            }
        };
        let descending = match input.sort.as_deref() {
            None | Some("ASC") => false,
            Some("DESC") => true,
            Some(other) => return Err(invalid_parameter(format!("Invalid sort: {other}"))),
        };

        let mut records: Vec<Record<TaskDefinitionData>> = self
            .state(ctx)
            .task_definitions
            .list::<&str>(&[])
            .into_iter()
            .filter(|r| r.status == status)
            .filter(|r| {
                input
                    .family_prefix
                    .as_deref()
                    .is_none_or(|prefix| r.payload.family.starts_with(prefix))
            })
            .collect();
        records.sort_by(|a, b| {
            (&a.payload.family, a.payload.revision).cmp(&(&b.payload.family, b.payload.revision))
        });
        if descending {
            records.reverse();
        }

        let arns = records.into_iter().map(|r| r.arn).collect();
        let (task_definition_arns, next_token) =
            paginate(arns, input.max_results, input.next_token.as_deref())?;
        Ok(ListTaskDefinitionsOutput {
            task_definition_arns,
            next_token,
        })
    }
}

/// A parsed `taskDefinition` argument.
#[derive(Debug, PartialEq, Eq)]
enum TaskDefinitionRef {
    /// Store key `family:revision`.
    Revision(String),
    /// Bare family name.
    Family(String),
}

fn parse_task_definition(value: &str) -> Result<TaskDefinitionRef, ServiceError> {
    let id = match Arn::parse(value) {
        Some(arn) if arn.service() == "ecs" => arn.resource_id().to_owned(),
        Some(_) => return Err(client(format!("Invalid task definition ARN: {value}"))),
        None => value.to_owned(),
    };
    match id.rsplit_once(':') {
        None => Ok(TaskDefinitionRef::Family(id)),
        Some((family, revision)) => {
            let revision: u64 = revision
                .parse()
                .ok()
                .filter(|r| *r > 0)
                .ok_or_else(|| client(format!("Invalid revision number. Number: {revision}")))?;
            Ok(TaskDefinitionRef::Revision(format!("{family}:{revision}")))
        }
    }
}

fn latest_active_revision(
    state: &EcsState,
    family: &str,
) -> Option<Record<TaskDefinitionData>> {
    let latest = state.task_definitions.latest_revision(family)?;
    (1..=latest)
        .rev()
        .filter_map(|rev| state.task_definitions.get(&format!("{family}:{rev}")).ok())
        .find(|r| r.status == EcsStatus::Active)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

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
        Err(invalid_parameter(format!(
            "{field} can have up to {MAX_NAME_LEN} characters: letters, numbers, hyphens, and underscores"
        )))
    }
}

fn validate_settings(settings: &[ClusterSetting]) -> Result<(), ServiceError> {
    for setting in settings {
        if setting.name != "containerInsights" {
            return Err(invalid_parameter(format!(
                "Unsupported cluster setting: {}",
                setting.name
            )));
        }
        if !CONTAINER_INSIGHTS_VALUES.contains(&setting.value.as_str()) {
            return Err(invalid_parameter(format!(
                "Invalid value for containerInsights: {}",
                setting.value
            )));
        }
    }
    Ok(())
}

fn cluster_view(record: &Record<ClusterData>, include_tags: bool) -> Cluster {
    let cluster = &record.payload;
    Cluster {
        cluster_arn: record.arn.clone(),
        cluster_name: record.key.clone(),
        status: record.status.as_str().to_owned(),
        registered_container_instances_count: 0,
        running_tasks_count: 0,
        pending_tasks_count: 0,
        active_services_count: 0,
        settings: cluster.settings.clone(),
        capacity_providers: cluster.capacity_providers.clone(),
        tags: if include_tags {
            cluster.tags.clone()
        } else {
            Vec::new()
        },
    }
}

#[allow(clippy::cast_precision_loss)]
fn task_definition_view(record: &Record<TaskDefinitionData>) -> TaskDefinition {
    let td = &record.payload;
    TaskDefinition {
        task_definition_arn: record.arn.clone(),
        family: td.family.clone(),
        revision: td.revision,
        status: record.status.as_str().to_owned(),
        container_definitions: td.container_definitions.clone(),
        volumes: td.volumes.clone(),
        task_role_arn: td.task_role_arn.clone(),
        execution_role_arn: td.execution_role_arn.clone(),
        network_mode: td.network_mode.clone(),
        requires_compatibilities: td.requires_compatibilities.clone(),
        cpu: td.cpu.clone(),
        memory: td.memory.clone(),
        registered_at: record.created_epoch_seconds(),
        deregistered_at: record
            .is_terminal()
            .then(|| record.updated_at.timestamp_millis() as f64 / 1000.0),
    }
}

fn paginate<T>(
    items: Vec<T>,
    max_results: Option<usize>,
    token: Option<&str>,
) -> Result<(Vec<T>, Option<String>), ServiceError> {
    let size = match max_results {
        None => DEFAULT_MAX_RESULTS,
        Some(n) if (1..=DEFAULT_MAX_RESULTS).contains(&n) => n,
        Some(n) => {
            return Err(invalid_parameter(format!(
                "maxResults must be between 1 and {DEFAULT_MAX_RESULTS}, got {n}"
            )));
        }
    };
    let start = match token {
        Some(t) => t
            .parse::<usize>()
            .map_err(|_| invalid_parameter(format!("Invalid nextToken: {t}")))?,
        None => 0,
    };
    let end = start.saturating_add(size);
    let next = (items.len() > end).then(|| end.to_string());
    let page = items.into_iter().skip(start).take(size).collect();
    Ok((page, next))
}
