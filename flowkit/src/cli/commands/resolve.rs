use crate::{cli::shared::Project, ops::flowkit_resolve};
use anyhow::Result;
use clap::Parser;

/// Print a script or contract with its imports replaced by the addresses they resolve to.
#[derive(Debug, Parser)]
#[clap(bin_name = "flowkit resolve", version)]
pub struct Command {
    #[clap(flatten)]
    pub project: Project,
    /// Location of the program to resolve, relative to the project directory.
    pub location: String,
}

pub(crate) fn exec(command: Command) -> Result<()> {
    flowkit_resolve::resolve(command)?;
    Ok(())
}
