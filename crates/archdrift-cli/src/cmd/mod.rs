use anyhow::Result;

use crate::args::{Cli, Command};

mod analyze;
mod baseline;
mod doctor;
mod snapshot;

pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command.clone() {
        Command::Baseline { action } => baseline::run(&cli, action).await,
        Command::Analyze { sha } => analyze::run(&cli, sha).await,
        Command::Snapshot { action } => snapshot::run(&cli, action).await,
        Command::Doctor => doctor::run(&cli).await,
    }
}
