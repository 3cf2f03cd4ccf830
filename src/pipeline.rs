use std::ops::ControlFlow;

use clap::ValueEnum;
use stacked_errors::{Error, Result};
use tracing::{debug, info, warn};

use crate::{
    catalog::{Catalog, CatalogOptions, EcsApi, SessionDescriptor},
    credentials::{CloudConfig, ConfigLoader, CredentialResolver},
    message::MessageCode,
    select::Selector,
};

/// The selecting stages in the order they run. Execute-command follows the
/// last one without a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Cluster,
    Service,
    Task,
    Container,
}

impl Stage {
    pub fn prompt(self) -> &'static str {
        match self {
            Stage::Cluster => "Select the target cluster",
            Stage::Service => "Select the target service",
            Stage::Task => "Select the target task ID",
            Stage::Container => "Select the target container",
        }
    }

    /// Reported when the stage's API call fails
    pub fn failure_code(self) -> MessageCode {
        match self {
            Stage::Cluster => MessageCode::Err003,
            Stage::Service => MessageCode::Err004,
            Stage::Task => MessageCode::Err005,
            Stage::Container => MessageCode::Err006,
        }
    }

    /// Reported when the stage has nothing to select
    pub fn empty_code(self) -> MessageCode {
        match self {
            Stage::Cluster => MessageCode::Inf010,
            Stage::Service => MessageCode::Inf003,
            Stage::Task => MessageCode::Inf005,
            Stage::Container => MessageCode::Inf007,
        }
    }

    /// Reported when the operator cancels the stage's menu
    pub fn cancel_code(self) -> MessageCode {
        match self {
            Stage::Cluster => MessageCode::Inf002,
            Stage::Service => MessageCode::Inf004,
            Stage::Task => MessageCode::Inf006,
            Stage::Container => MessageCode::Inf008,
        }
    }
}

/// What a failed execute-command means for the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExecFailurePolicy {
    /// Report that execute command is not enabled and exit successfully
    #[default]
    Notice,
    /// Report the failure and exit unsuccessfully
    Fatal,
}

/// The chosen path down the hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecTarget {
    pub cluster: String,
    pub service: String,
    pub task: String,
    pub container: String,
}

/// Everything the session plugin needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecSession {
    pub region: String,
    pub target: ExecTarget,
    pub descriptor: SessionDescriptor,
}

/// How a run that did not fail ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A session is ready to be handed to the plugin
    Ready(ExecSession),
    /// The run stopped early with an informational message
    Halted(MessageCode),
}

/// A fatal error together with the message it is reported with
#[derive(Debug, thiserror::Error)]
#[error("{code}: {error}")]
pub struct Failure {
    pub code: MessageCode,
    pub error: Error,
}

impl Failure {
    pub fn new(code: MessageCode, error: Error) -> Self {
        Self { code, error }
    }
}

/// Resolves credentials and walks cluster -> service -> task -> container,
/// then requests an execute-command session
#[derive(Debug)]
pub struct Pipeline<L, S> {
    resolver: CredentialResolver<L>,
    selector: S,
    options: CatalogOptions,
    exec_failure: ExecFailurePolicy,
}

impl<L: ConfigLoader, S: Selector> Pipeline<L, S> {
    pub fn new(
        resolver: CredentialResolver<L>,
        selector: S,
        options: CatalogOptions,
        exec_failure: ExecFailurePolicy,
    ) -> Self {
        Self {
            resolver,
            selector,
            options,
            exec_failure,
        }
    }

    pub fn selector(&self) -> &S {
        &self.selector
    }

    /// Runs the whole pipeline. `connect` builds the ECS API from the resolved
    /// configuration and is only called if the configuration has a region.
    pub async fn run<E, F>(
        &self,
        profile: &str,
        connect: F,
    ) -> std::result::Result<Outcome, Failure>
    where
        E: EcsApi,
        F: FnOnce(&CloudConfig) -> E,
    {
        let config = self
            .resolver
            .resolve(profile)
            .await
            .map_err(|e| Failure::new(MessageCode::Err002, e))?;
        if !config.has_region() {
            info!("profile {profile:?} has no region");
            return Ok(Outcome::Halted(MessageCode::Inf001))
        }
        let catalog = Catalog::new(connect(&config), self.options.clone());
        self.run_with_catalog(&catalog, config.region).await
    }

    /// Runs the stages after credential resolution
    pub async fn run_with_catalog<E: EcsApi>(
        &self,
        catalog: &Catalog<E>,
        region: String,
    ) -> std::result::Result<Outcome, Failure> {
        let cluster = match self.narrow(Stage::Cluster, catalog.list_clusters().await)? {
            ControlFlow::Continue(cluster) => cluster,
            ControlFlow::Break(code) => return Ok(Outcome::Halted(code)),
        };
        let service = match self.narrow(Stage::Service, catalog.list_services(&cluster).await)? {
            ControlFlow::Continue(service) => service,
            ControlFlow::Break(code) => return Ok(Outcome::Halted(code)),
        };
        let task = match self.narrow(Stage::Task, catalog.list_tasks(&cluster, &service).await)? {
            ControlFlow::Continue(task) => task,
            ControlFlow::Break(code) => return Ok(Outcome::Halted(code)),
        };
        let container = match self.narrow(
            Stage::Container,
            catalog.list_containers(&cluster, &task).await,
        )? {
            ControlFlow::Continue(container) => container,
            ControlFlow::Break(code) => return Ok(Outcome::Halted(code)),
        };

        let target = ExecTarget {
            cluster,
            service,
            task,
            container,
        };
        match catalog
            .execute_container(&target.cluster, &target.task, &target.container)
            .await
        {
            Ok(descriptor) => {
                debug!("execute command session {} started", descriptor.session_id);
                Ok(Outcome::Ready(ExecSession {
                    region,
                    target,
                    descriptor,
                }))
            }
            Err(e) => match self.exec_failure {
                ExecFailurePolicy::Notice => {
                    warn!("{e}");
                    Ok(Outcome::Halted(MessageCode::Inf009))
                }
                ExecFailurePolicy::Fatal => Err(Failure::new(MessageCode::Err007, e)),
            },
        }
    }

    /// Maps one stage's listing to a choice, or to the code the run halts
    /// with
    fn narrow(
        &self,
        stage: Stage,
        listed: Result<Vec<String>>,
    ) -> std::result::Result<ControlFlow<MessageCode, String>, Failure> {
        let options = listed.map_err(|e| Failure::new(stage.failure_code(), e))?;
        if options.is_empty() {
            info!("nothing to select at stage {stage:?}");
            return Ok(ControlFlow::Break(stage.empty_code()))
        }
        match self.selector.choose(&options, stage) {
            Ok(Some(choice)) => {
                debug!("selected {choice:?} at stage {stage:?}");
                Ok(ControlFlow::Continue(choice))
            }
            Ok(None) => {
                info!("selection cancelled at stage {stage:?}");
                Ok(ControlFlow::Break(stage.cancel_code()))
            }
            Err(e) => Err(Failure::new(MessageCode::Err999, e)),
        }
    }
}
