use std::process::ExitCode;

use tracing::{error, info};

use crate::{
    credentials::{AwsConfigLoader, CredentialResolver, ProfileEnv},
    ecs_client::SdkEcs,
    launcher::SessionPlugin,
    message::MessageCode,
    pipeline::{Failure, Outcome, Pipeline},
    select::TerminalSelector,
    settings::Settings,
};

/// How the process ends. Informational endings are successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success,
    Failure,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        match exit {
            Exit::Success => ExitCode::SUCCESS,
            Exit::Failure => ExitCode::FAILURE,
        }
    }
}

/// Prints the failure's message and logs its error
fn fail(failure: Failure) -> Exit {
    error!("{}: {}", failure.code, failure.error);
    failure.code.print();
    Exit::Failure
}

/// Checks for the session plugin, runs the pipeline against AWS with the
/// terminal menu, and hands a ready session to the plugin
pub async fn run(settings: &Settings) -> Exit {
    let plugin = match SessionPlugin::locate(&settings.plugin) {
        Ok(plugin) => plugin,
        Err(e) => return fail(Failure::new(MessageCode::Err001, e)),
    };
    let pipeline = Pipeline::new(
        CredentialResolver::new(AwsConfigLoader, ProfileEnv::from_process_env()),
        TerminalSelector,
        settings.catalog.clone(),
        settings.exec_failure,
    );
    let outcome = pipeline.run(&settings.profile, SdkEcs::new).await;
    conclude(&plugin, outcome).await
}

/// Reports a finished pipeline run, launching the plugin if a session is
/// ready
pub async fn conclude(
    plugin: &SessionPlugin,
    outcome: std::result::Result<Outcome, Failure>,
) -> Exit {
    match outcome {
        Ok(Outcome::Halted(code)) => {
            code.print();
            Exit::Success
        }
        Ok(Outcome::Ready(session)) => match plugin.launch(&session).await {
            Ok(()) => {
                info!("session {} ended", session.descriptor.session_id);
                Exit::Success
            }
            Err(e) => fail(Failure::new(MessageCode::Err999, e)),
        },
        Err(failure) => fail(failure),
    }
}

#[cfg(test)]
mod tests {
    use stacked_errors::{bail, Result};

    use super::*;
    use crate::{
        catalog::SessionDescriptor,
        pipeline::{ExecSession, ExecTarget},
        settings::Args,
        signal_guard::DISPOSITION_LOCK,
    };

    fn session() -> ExecSession {
        ExecSession {
            region: "eu-west-1".to_owned(),
            target: ExecTarget {
                cluster: "app-1".to_owned(),
                service: "svcA".to_owned(),
                task: "0a1b2c".to_owned(),
                container: "app".to_owned(),
            },
            descriptor: SessionDescriptor {
                session_id: "ecs-execute-command-app".to_owned(),
                stream_url: "wss://example.invalid/stream".to_owned(),
                token_value: "token".to_owned(),
            },
        }
    }

    #[tokio::test]
    async fn missing_plugin_fails_first() {
        let settings: Settings = <Args as clap::Parser>::try_parse_from([
            "fexec",
            "--plugin",
            "fexec-test-no-such-session-plugin",
        ])
        .unwrap()
        .into();
        assert_eq!(run(&settings).await, Exit::Failure);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn outcomes_map_to_exits() {
        let plugin = SessionPlugin::locate("true").unwrap();
        assert_eq!(
            conclude(&plugin, Ok(Outcome::Halted(MessageCode::Inf005))).await,
            Exit::Success
        );
        assert_eq!(
            conclude(&plugin, Ok(Outcome::Halted(MessageCode::Inf009))).await,
            Exit::Success
        );
        fn describe() -> Result<()> {
            bail!("DescribeTasks failed")
        }
        let failure = Failure::new(MessageCode::Err006, describe().unwrap_err());
        assert_eq!(conclude(&plugin, Err(failure)).await, Exit::Failure);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn plugin_exit_status() {
        let _lock = DISPOSITION_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let ok = SessionPlugin::locate("true").unwrap();
        assert_eq!(
            conclude(&ok, Ok(Outcome::Ready(session()))).await,
            Exit::Success
        );
        let failing = SessionPlugin::locate("false").unwrap();
        assert_eq!(
            conclude(&failing, Ok(Outcome::Ready(session()))).await,
            Exit::Failure
        );
    }
}
