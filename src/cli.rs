mod connection;
mod debug;
mod parameters;
mod plan;
mod sensor;
mod watch;

use clap::{Parser, Subcommand};

use crate::cli::{debug::DebugArgs, plan::PlanArgs, watch::WatchArgs};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one planning pass and print the result.
    #[clap(name = "plan")]
    Plan(Box<PlanArgs>),

    /// Keep re-planning on every hour change and sensor update.
    #[clap(name = "watch")]
    Watch(Box<WatchArgs>),

    /// Development tools.
    #[clap(name = "debug")]
    Debug(Box<DebugArgs>),
}
