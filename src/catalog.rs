use async_trait::async_trait;
use clap::ValueEnum;
use serde::Serialize;
use stacked_errors::{Result, StackableErr};
use tracing::debug;

use crate::arn;

/// The number of results requested from every list call. Only the first page
/// is ever looked at.
pub const MAX_RESULTS: i32 = 50;

/// The command run by execute-command unless configured otherwise
pub const DEFAULT_COMMAND: &str = "/bin/sh";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LaunchType {
    Fargate,
    Ec2,
    External,
}

impl LaunchType {
    /// The name used by the ECS API
    pub fn as_str(self) -> &'static str {
        match self {
            LaunchType::Fargate => "FARGATE",
            LaunchType::Ec2 => "EC2",
            LaunchType::External => "EXTERNAL",
        }
    }
}

/// How task ARNs are turned into selectable names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TaskNaming {
    /// Only the task ID
    #[default]
    Id,
    /// `{cluster}/{task ID}`
    ClusterQualified,
}

impl TaskNaming {
    pub fn name(self, task_arn: &str) -> Result<String> {
        match self {
            TaskNaming::Id => Ok(arn::last_segment(task_arn).to_owned()),
            TaskNaming::ClusterQualified => arn::last_segments(task_arn, 2).map(str::to_owned),
        }
    }
}

/// What execute-command hands back. This is passed through to the session
/// plugin as JSON and never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionDescriptor {
    pub session_id: String,
    pub stream_url: String,
    pub token_value: String,
}

/// The raw ECS calls, returning ARNs and names as the service reports them
#[async_trait]
pub trait EcsApi: Send + Sync {
    async fn list_cluster_arns(&self, max_results: i32) -> Result<Vec<String>>;

    async fn list_service_arns(
        &self,
        cluster: &str,
        launch_type: Option<LaunchType>,
        max_results: i32,
    ) -> Result<Vec<String>>;

    async fn list_task_arns(
        &self,
        cluster: &str,
        service: &str,
        launch_type: Option<LaunchType>,
        max_results: i32,
    ) -> Result<Vec<String>>;

    /// Container names of the described task
    async fn describe_task_containers(&self, cluster: &str, task: &str) -> Result<Vec<String>>;

    /// Starts an interactive `command` in the container
    async fn execute_command(
        &self,
        cluster: &str,
        task: &str,
        container: &str,
        command: &str,
    ) -> Result<SessionDescriptor>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogOptions {
    /// If set, services and tasks are filtered to this launch type and
    /// clusters without a matching service are skipped
    pub launch_type: Option<LaunchType>,
    pub task_naming: TaskNaming,
    pub max_results: i32,
    /// Run by `execute_container`
    pub command: String,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            launch_type: None,
            task_naming: TaskNaming::default(),
            max_results: MAX_RESULTS,
            command: DEFAULT_COMMAND.to_owned(),
        }
    }
}

/// The narrowing operations of the pipeline. An empty `Vec` means there is
/// nothing to select and is never an error.
#[derive(Debug)]
pub struct Catalog<E> {
    api: E,
    options: CatalogOptions,
}

impl<E: EcsApi> Catalog<E> {
    pub fn new(api: E, options: CatalogOptions) -> Self {
        Self { api, options }
    }

    pub fn api(&self) -> &E {
        &self.api
    }

    /// Sorted cluster names. With a launch type configured, clusters are
    /// probed and those without a matching service are dropped.
    pub async fn list_clusters(&self) -> Result<Vec<String>> {
        let arns = self
            .api
            .list_cluster_arns(self.options.max_results)
            .await
            .stack_err("Catalog::list_clusters")?;
        let mut clusters = vec![];
        for cluster_arn in &arns {
            let cluster = arn::cluster_name(cluster_arn).stack()?;
            if let Some(launch_type) = self.options.launch_type {
                let services = self
                    .api
                    .list_service_arns(cluster, Some(launch_type), self.options.max_results)
                    .await
                    .stack_err_with(|| {
                        format!("Catalog::list_clusters -> probing cluster {cluster}")
                    })?;
                if services.is_empty() {
                    debug!("skipping cluster {cluster}, no {} services", launch_type.as_str());
                    continue
                }
            }
            clusters.push(cluster.to_owned());
        }
        clusters.sort();
        Ok(clusters)
    }

    /// Sorted service names of `cluster`
    pub async fn list_services(&self, cluster: &str) -> Result<Vec<String>> {
        let arns = self
            .api
            .list_service_arns(cluster, self.options.launch_type, self.options.max_results)
            .await
            .stack_err_with(|| format!("Catalog::list_services(cluster: {cluster})"))?;
        let mut services: Vec<String> = arns
            .iter()
            .map(|s| arn::service_name(s).to_owned())
            .collect();
        services.sort();
        Ok(services)
    }

    /// Task names of `service`, in the order the API returned them
    pub async fn list_tasks(&self, cluster: &str, service: &str) -> Result<Vec<String>> {
        let arns = self
            .api
            .list_task_arns(
                cluster,
                service,
                self.options.launch_type,
                self.options.max_results,
            )
            .await
            .stack_err_with(|| {
                format!("Catalog::list_tasks(cluster: {cluster}, service: {service})")
            })?;
        let mut tasks = Vec::with_capacity(arns.len());
        for task_arn in &arns {
            tasks.push(self.options.task_naming.name(task_arn).stack()?);
        }
        Ok(tasks)
    }

    /// Sorted container names of `task`
    pub async fn list_containers(&self, cluster: &str, task: &str) -> Result<Vec<String>> {
        let mut containers = self
            .api
            .describe_task_containers(cluster, task)
            .await
            .stack_err_with(|| {
                format!("Catalog::list_containers(cluster: {cluster}, task: {task})")
            })?;
        containers.sort();
        Ok(containers)
    }

    pub async fn execute_container(
        &self,
        cluster: &str,
        task: &str,
        container: &str,
    ) -> Result<SessionDescriptor> {
        self.api
            .execute_command(cluster, task, container, &self.options.command)
            .await
            .stack_err_with(|| {
                format!(
                    "Catalog::execute_container(cluster: {cluster}, task: {task}, container: \
                     {container})"
                )
            })
    }
}
