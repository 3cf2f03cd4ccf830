use std::{ffi::OsStr, path::PathBuf, process::Stdio};

use stacked_errors::{bail, Result, StackableErr};
use tokio::process;
use tracing::{debug, info};

use crate::{pipeline::ExecSession, signal_guard::SignalGuard};

/// The plugin the AWS CLI uses for `ecs execute-command`
pub const SESSION_PLUGIN: &str = "session-manager-plugin";
/// The plugin action, always the last argument
pub const START_SESSION: &str = "StartSession";

/// A located session plugin executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlugin {
    path: PathBuf,
}

impl SessionPlugin {
    /// Looks up `program` on `PATH` (or checks it directly if it is a path).
    /// This should happen before anything talks to the cloud.
    pub fn locate(program: impl AsRef<OsStr>) -> Result<Self> {
        let program = program.as_ref();
        let path = which::which(program)
            .stack_err_with(|| format!("SessionPlugin::locate(program: {program:?})"))?;
        debug!("found session plugin at {path:?}");
        Ok(Self { path })
    }

    /// The three positional arguments: the session descriptor as JSON, the
    /// region, and the action
    pub fn args(session: &ExecSession) -> Result<Vec<String>> {
        let descriptor = serde_json::to_string_pretty(&session.descriptor)
            .stack_err("SessionPlugin::args -> serializing the session descriptor")?;
        Ok(vec![
            descriptor,
            session.region.clone(),
            START_SESSION.to_owned(),
        ])
    }

    /// Runs the plugin attached to this terminal and waits for it to exit.
    /// Interrupts are suppressed in this process for exactly that long.
    pub async fn launch(&self, session: &ExecSession) -> Result<()> {
        let args = Self::args(session)?;
        let mut cmd = process::Command::new(&self.path);
        cmd.args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        info!(
            "starting session {} into {}/{}/{}",
            session.descriptor.session_id,
            session.target.cluster,
            session.target.task,
            session.target.container
        );
        let guard = SignalGuard::suppress_interrupts().stack()?;
        let status = cmd.status().await.stack_err_with(|| {
            format!("SessionPlugin::launch -> failed to run {:?}", self.path)
        });
        drop(guard);
        let status = status?;
        if !status.success() {
            bail!(
                "SessionPlugin::launch -> {:?} exited unsuccessfully with {status}",
                self.path
            )
        }
        debug!("session plugin exited with {status}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::SessionDescriptor,
        pipeline::ExecTarget,
        signal_guard::DISPOSITION_LOCK,
    };

    fn session() -> ExecSession {
        ExecSession {
            region: "ap-northeast-1".to_owned(),
            target: ExecTarget {
                cluster: "app".to_owned(),
                service: "web".to_owned(),
                task: "abc".to_owned(),
                container: "nginx".to_owned(),
            },
            descriptor: SessionDescriptor {
                session_id: "ecs-execute-command-0123".to_owned(),
                stream_url: "wss://ssmmessages.ap-northeast-1.amazonaws.com/v1/data-channel/x"
                    .to_owned(),
                token_value: "AAEAA".to_owned(),
            },
        }
    }

    #[test]
    fn plugin_arguments() {
        let args = SessionPlugin::args(&session()).unwrap();
        assert_eq!(args.len(), 3);
        let v: serde_json::Value = serde_json::from_str(&args[0]).unwrap();
        assert_eq!(v["SessionId"], "ecs-execute-command-0123");
        assert_eq!(v["TokenValue"], "AAEAA");
        assert_eq!(v.as_object().unwrap().len(), 3);
        // indented, one field per line
        assert_eq!(args[0].lines().count(), 5);
        assert!(args[0].lines().all(|l| l == l.trim_end()));
        assert_eq!(args[1], "ap-northeast-1");
        assert_eq!(args[2], "StartSession");
    }

    #[test]
    fn missing_plugin() {
        assert!(SessionPlugin::locate("fexec-test-no-such-session-plugin").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_status_is_checked() {
        let _lock = DISPOSITION_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        SessionPlugin::locate("true")
            .unwrap()
            .launch(&session())
            .await
            .unwrap();
        assert!(SessionPlugin::locate("false")
            .unwrap()
            .launch(&session())
            .await
            .is_err());
    }
}
