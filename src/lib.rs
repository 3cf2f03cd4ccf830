//! Interactive `ecs execute-command`: pick a cluster, service, task, and
//! container from terminal menus, then hand the session to the
//! `session-manager-plugin`.
//!
//! Every stage runs against the [catalog::EcsApi], [credentials::ConfigLoader],
//! and [select::Selector] traits, so [pipeline::Pipeline] can be driven
//! without AWS or a terminal.

pub mod app;
/// Name extraction from ARNs
pub mod arn;
pub mod catalog;
pub mod credentials;
pub mod ecs_client;
pub mod launcher;
/// The coded messages the program exits with
pub mod message;
pub mod pipeline;
pub mod select;
pub mod settings;
pub mod signal_guard;

pub use message::MessageCode;
pub use pipeline::{Failure, Outcome, Pipeline};
/// This reexport helps with dependency wrangling
pub use stacked_errors;
