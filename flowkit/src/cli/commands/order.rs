use crate::{cli::shared::Project, ops::flowkit_order};
use anyhow::Result;
use clap::Parser;

/// Print the order in which the project's contracts must be deployed on a network.
///
/// Every contract is placed after all of the contracts it imports. Contracts without an
/// ordering between them keep the order in which they are listed under `[deployments]`.
#[derive(Debug, Parser)]
#[clap(bin_name = "flowkit order", version)]
pub struct Command {
    #[clap(flatten)]
    pub project: Project,
    /// Print the deployment order as JSON.
    #[clap(long)]
    pub json: bool,
}

pub(crate) fn exec(command: Command) -> Result<()> {
    flowkit_order::order(command)?;
    Ok(())
}
