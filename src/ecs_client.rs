use async_trait::async_trait;
use aws_sdk_ecs::{types, Client};
use stacked_errors::{bail, Result, StackableErr};
use tracing::debug;

use crate::{
    catalog::{EcsApi, LaunchType, SessionDescriptor},
    credentials::CloudConfig,
};

fn sdk_launch_type(launch_type: Option<LaunchType>) -> Option<types::LaunchType> {
    launch_type.map(|l| match l {
        LaunchType::Fargate => types::LaunchType::Fargate,
        LaunchType::Ec2 => types::LaunchType::Ec2,
        LaunchType::External => types::LaunchType::External,
    })
}

/// [EcsApi] backed by `aws-sdk-ecs`
#[derive(Debug, Clone)]
pub struct SdkEcs {
    client: Client,
}

impl SdkEcs {
    pub fn new(config: &CloudConfig) -> Self {
        Self {
            client: Client::new(&config.sdk_config),
        }
    }
}

#[async_trait]
impl EcsApi for SdkEcs {
    async fn list_cluster_arns(&self, max_results: i32) -> Result<Vec<String>> {
        let output = self
            .client
            .list_clusters()
            .max_results(max_results)
            .send()
            .await
            .stack_err("ListClusters failed")?;
        debug!("ListClusters returned {} ARNs", output.cluster_arns().len());
        Ok(output.cluster_arns().to_vec())
    }

    async fn list_service_arns(
        &self,
        cluster: &str,
        launch_type: Option<LaunchType>,
        max_results: i32,
    ) -> Result<Vec<String>> {
        let output = self
            .client
            .list_services()
            .cluster(cluster)
            .set_launch_type(sdk_launch_type(launch_type))
            .max_results(max_results)
            .send()
            .await
            .stack_err_with(|| format!("ListServices(cluster: {cluster}) failed"))?;
        Ok(output.service_arns().to_vec())
    }

    async fn list_task_arns(
        &self,
        cluster: &str,
        service: &str,
        launch_type: Option<LaunchType>,
        max_results: i32,
    ) -> Result<Vec<String>> {
        let output = self
            .client
            .list_tasks()
            .cluster(cluster)
            .service_name(service)
            .set_launch_type(sdk_launch_type(launch_type))
            .max_results(max_results)
            .send()
            .await
            .stack_err_with(|| {
                format!("ListTasks(cluster: {cluster}, service: {service}) failed")
            })?;
        Ok(output.task_arns().to_vec())
    }

    async fn describe_task_containers(&self, cluster: &str, task: &str) -> Result<Vec<String>> {
        let output = self
            .client
            .describe_tasks()
            .cluster(cluster)
            .tasks(task)
            .send()
            .await
            .stack_err_with(|| format!("DescribeTasks(cluster: {cluster}, task: {task}) failed"))?;
        let Some(described) = output.tasks().first() else {
            let reasons: Vec<&str> = output
                .failures()
                .iter()
                .filter_map(|f| f.reason())
                .collect();
            bail!("DescribeTasks(cluster: {cluster}, task: {task}) -> no task, failures: {reasons:?}")
        };
        Ok(described
            .containers()
            .iter()
            .filter_map(|c| c.name())
            .map(str::to_owned)
            .collect())
    }

    async fn execute_command(
        &self,
        cluster: &str,
        task: &str,
        container: &str,
        command: &str,
    ) -> Result<SessionDescriptor> {
        let output = self
            .client
            .execute_command()
            .cluster(cluster)
            .task(task)
            .container(container)
            .command(command)
            .interactive(true)
            .send()
            .await
            .stack_err_with(|| {
                format!(
                    "ExecuteCommand(cluster: {cluster}, task: {task}, container: {container}) \
                     failed"
                )
            })?;
        let session = output
            .session()
            .stack_err("ExecuteCommand -> the response has no session")?;
        Ok(SessionDescriptor {
            session_id: session.session_id().unwrap_or_default().to_owned(),
            stream_url: session.stream_url().unwrap_or_default().to_owned(),
            token_value: session.token_value().unwrap_or_default().to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_types_match_the_api_names() {
        assert_eq!(sdk_launch_type(None), None);
        for l in [LaunchType::Fargate, LaunchType::Ec2, LaunchType::External] {
            assert_eq!(sdk_launch_type(Some(l)).unwrap().as_str(), l.as_str());
        }
    }
}
