use std::process::ExitCode;

use clap::Parser;
use fargate_exec::{
    app,
    settings::{Args, Settings},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    // logs go to stderr so they stay out of the menus and messages
    let default_filter = if args.verbose {
        "warn,fargate_exec=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings: Settings = args.into();
    app::run(&settings).await.into()
}
