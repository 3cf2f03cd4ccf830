use core::fmt;
use std::{fmt::Display, str::FromStr};

use owo_colors::OwoColorize;
use stacked_errors::{bail, Error};

const PLUGIN_INSTALL_URL: &str = "https://docs.aws.amazon.com/systems-manager/latest/userguide/\
                                  session-manager-working-with-install-plugin.html";

/// If a message is informational (green, stdout) or an error (red, stderr)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// The coded messages printed to the operator. Informational codes end the
/// run successfully, error codes end it with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageCode {
    /// No usable profile information (empty region)
    Inf001,
    /// No cluster selected
    Inf002,
    /// The cluster has no services
    Inf003,
    /// No service selected
    Inf004,
    /// The service has no tasks
    Inf005,
    /// No task selected
    Inf006,
    /// The task has no containers
    Inf007,
    /// No container selected
    Inf008,
    /// Execute command is not enabled for the task
    Inf009,
    /// No clusters for the profile
    Inf010,
    /// The session plugin is not installed
    Err001,
    /// Loading the profile failed
    Err002,
    /// Listing clusters failed
    Err003,
    /// Listing services failed
    Err004,
    /// Listing tasks failed
    Err005,
    /// Describing the task containers failed
    Err006,
    /// Execute command failed
    Err007,
    /// Anything else
    Err999,
}

use MessageCode::*;

impl MessageCode {
    pub const ALL: [MessageCode; 18] = [
        Inf001, Inf002, Inf003, Inf004, Inf005, Inf006, Inf007, Inf008, Inf009, Inf010, Err001,
        Err002, Err003, Err004, Err005, Err006, Err007, Err999,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Inf001 => "INF001",
            Inf002 => "INF002",
            Inf003 => "INF003",
            Inf004 => "INF004",
            Inf005 => "INF005",
            Inf006 => "INF006",
            Inf007 => "INF007",
            Inf008 => "INF008",
            Inf009 => "INF009",
            Inf010 => "INF010",
            Err001 => "ERR001",
            Err002 => "ERR002",
            Err003 => "ERR003",
            Err004 => "ERR004",
            Err005 => "ERR005",
            Err006 => "ERR006",
            Err007 => "ERR007",
            Err999 => "ERR999",
        }
    }

    pub fn severity(self) -> Severity {
        if self.code().starts_with("INF") {
            Severity::Info
        } else {
            Severity::Error
        }
    }

    /// The uncolored message text
    pub fn text(self) -> String {
        match self {
            Inf001 => "No usable profile information was found, exiting.".to_owned(),
            Inf002 => "No cluster was selected, exiting.".to_owned(),
            Inf003 => "The cluster has no services, exiting.".to_owned(),
            Inf004 => "No service was selected, exiting.".to_owned(),
            Inf005 => "The service has no tasks, exiting.".to_owned(),
            Inf006 => "No task was selected, exiting.".to_owned(),
            Inf007 => "The task has no containers, exiting.".to_owned(),
            Inf008 => "No container was selected, exiting.".to_owned(),
            Inf009 => "Execute command is not enabled for this task, exiting.".to_owned(),
            Inf010 => "No ECS clusters are associated with the profile, exiting.".to_owned(),
            Err001 => format!(
                "session-manager-plugin is not installed, see the following to install \
                 it:\n{PLUGIN_INSTALL_URL}"
            ),
            Err002 => "Failed to load the AWS profile.".to_owned(),
            Err003 => "Failed to retrieve the ECS clusters for the profile.".to_owned(),
            Err004 => "Failed to retrieve the services for the cluster.".to_owned(),
            Err005 => "Failed to retrieve the tasks for the service.".to_owned(),
            Err006 => "Failed to retrieve the containers for the task.".to_owned(),
            Err007 => "Execute command failed for the container.".to_owned(),
            Err999 => "An unexpected error occurred.".to_owned(),
        }
    }

    /// The message text colored according to its severity
    pub fn render(self) -> String {
        let text = self.text();
        match self.severity() {
            Severity::Info => text.green().to_string(),
            Severity::Error => text.red().bold().to_string(),
        }
    }

    /// Prints the rendered message, informational ones to stdout and errors to
    /// stderr
    pub fn print(self) {
        tracing::debug!("printing message {}", self.code());
        match self.severity() {
            Severity::Info => println!("{}", self.render()),
            Severity::Error => eprintln!("{}", self.render()),
        }
    }
}

impl Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for MessageCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for code in Self::ALL {
            if code.code() == s {
                return Ok(code)
            }
        }
        bail!("MessageCode::from_str -> unknown message code {s:?}")
    }
}
