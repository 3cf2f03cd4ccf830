use clap::Parser;

use crate::{
    catalog::{CatalogOptions, LaunchType, TaskNaming, DEFAULT_COMMAND, MAX_RESULTS},
    credentials::DEFAULT_PROFILE,
    launcher::SESSION_PLUGIN,
    pipeline::ExecFailurePolicy,
};

/// Interactively pick an ECS cluster, service, task, and container, then open
/// a shell in it through the session manager plugin
#[derive(Parser, Debug, Clone)]
#[command(name = "fexec", version, about)]
pub struct Args {
    /// The AWS profile to use. Ignored while `AWS_SESSION_TOKEN` is set
    #[arg(short, long, default_value_t = String::from(DEFAULT_PROFILE))]
    pub profile: String,
    /// Only offer services and tasks of this launch type, and skip clusters
    /// that have none
    #[arg(short, long, value_enum, env = "FEXEC_LAUNCH_TYPE")]
    pub launch_type: Option<LaunchType>,
    /// Same as `--launch-type fargate`
    #[arg(long, conflicts_with = "launch_type")]
    pub fargate: bool,
    /// The command run in the container
    #[arg(short, long, env = "FEXEC_COMMAND", default_value_t = String::from(DEFAULT_COMMAND))]
    pub command: String,
    #[arg(long, value_enum, env = "FEXEC_TASK_NAMING", default_value_t)]
    pub task_naming: TaskNaming,
    /// Whether a failed execute-command ends the run successfully with a
    /// notice or with an error
    #[arg(long, value_enum, env = "FEXEC_EXEC_FAILURE", default_value_t)]
    pub exec_failure: ExecFailurePolicy,
    /// The session plugin program, looked up on `PATH`
    #[arg(long, env = "FEXEC_SESSION_PLUGIN", default_value_t = String::from(SESSION_PLUGIN))]
    pub plugin: String,
    /// Log at debug level, `RUST_LOG` takes precedence
    #[arg(short, long)]
    pub verbose: bool,
}

/// Everything a run needs, resolved from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub profile: String,
    pub catalog: CatalogOptions,
    pub exec_failure: ExecFailurePolicy,
    pub plugin: String,
}

impl From<Args> for Settings {
    fn from(args: Args) -> Self {
        let launch_type = if args.fargate {
            Some(LaunchType::Fargate)
        } else {
            args.launch_type
        };
        Self {
            profile: args.profile,
            catalog: CatalogOptions {
                launch_type,
                task_naming: args.task_naming,
                max_results: MAX_RESULTS,
                command: args.command,
            },
            exec_failure: args.exec_failure,
            plugin: args.plugin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(args: &[&str]) -> Settings {
        Args::try_parse_from(std::iter::once("fexec").chain(args.iter().copied()))
            .unwrap()
            .into()
    }

    #[test]
    fn defaults() {
        let settings = settings(&[]);
        assert_eq!(settings.profile, "default");
        assert_eq!(settings.catalog, CatalogOptions::default());
        assert_eq!(settings.exec_failure, ExecFailurePolicy::Notice);
        assert_eq!(settings.plugin, "session-manager-plugin");
    }

    #[test]
    fn flags() {
        let settings = settings(&[
            "-p",
            "staging",
            "-l",
            "ec2",
            "-c",
            "/bin/bash",
            "--task-naming",
            "cluster-qualified",
            "--exec-failure",
            "fatal",
            "--plugin",
            "/opt/bin/session-manager-plugin",
        ]);
        assert_eq!(settings.profile, "staging");
        assert_eq!(settings.catalog.launch_type, Some(LaunchType::Ec2));
        assert_eq!(settings.catalog.command, "/bin/bash");
        assert_eq!(settings.catalog.task_naming, TaskNaming::ClusterQualified);
        assert_eq!(settings.catalog.max_results, 50);
        assert_eq!(settings.exec_failure, ExecFailurePolicy::Fatal);
        assert_eq!(settings.plugin, "/opt/bin/session-manager-plugin");
    }

    #[test]
    fn fargate_shorthand() {
        assert_eq!(
            settings(&["--fargate"]).catalog.launch_type,
            Some(LaunchType::Fargate)
        );
        assert!(Args::try_parse_from(["fexec", "--fargate", "-l", "ec2"]).is_err());
        assert!(Args::try_parse_from(["fexec", "-l", "spot"]).is_err());
    }

    #[test]
    fn verbose() {
        assert!(Args::try_parse_from(["fexec", "-v"]).unwrap().verbose);
        assert!(!Args::try_parse_from(["fexec"]).unwrap().verbose);
    }
}
