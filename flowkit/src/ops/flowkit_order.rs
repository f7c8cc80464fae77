use crate::{cli::OrderCommand, manifest::ProjectManifestFile, ops::resolver_util};
use anyhow::Result;
use flowkit_resolver::{Address, Program};
use flowkit_tracing::{println_action_green, println_yellow_err};
use serde::Serialize;
use tracing::info;

/// One contract deployment, in the order it must happen.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeploymentStep {
    pub name: String,
    pub location: String,
    pub account_name: String,
    pub account_address: Address,
    pub args: Vec<serde_json::Value>,
}

impl From<&Program> for DeploymentStep {
    fn from(program: &Program) -> Self {
        Self {
            name: program.name().to_string(),
            location: program.location().to_string(),
            account_name: program.account_name().to_string(),
            account_address: program.account_address(),
            args: program.args().to_vec(),
        }
    }
}

/// Determine and print the deployment order for the project's contracts on the network.
pub fn order(command: OrderCommand) -> Result<Vec<DeploymentStep>> {
    let network = &command.project.network;
    let manifest = command.project.manifest()?;
    let steps = deployment_plan(&manifest, network)?;

    if command.json {
        info!("{}", serde_json::to_string_pretty(&steps)?);
    } else if steps.is_empty() {
        println_yellow_err(&format!(
            "No contracts are deployed on network `{network}` in {}",
            manifest.path().display()
        ));
    } else {
        println_action_green(
            "Ordered",
            &format!("{} contract(s) for network `{network}`", steps.len()),
        );
        for (ix, step) in steps.iter().enumerate() {
            info!(
                "{:>5}. {} -> {} ({})",
                ix + 1,
                step.name,
                step.account_name,
                step.account_address
            );
        }
    }

    Ok(steps)
}

/// The contracts deployed on `network`, sorted so every contract follows the contracts it
/// imports.
pub fn deployment_plan(
    manifest: &ProjectManifestFile,
    network: &str,
) -> Result<Vec<DeploymentStep>> {
    let mut resolver = resolver_util::contracts_resolver(manifest, network)?;
    let sorted = resolver.sort().map_err(resolver_util::describe)?;
    Ok(sorted.iter().map(DeploymentStep::from).collect())
}
