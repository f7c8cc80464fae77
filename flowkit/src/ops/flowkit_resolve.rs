use crate::{cli::ResolveCommand, manifest::ProjectManifestFile, ops::resolver_util};
use anyhow::{anyhow, Result};
use flowkit_resolver::Address;
use tracing::info;

/// Print the program at the given location with every import resolved to an address.
pub fn resolve(command: ResolveCommand) -> Result<String> {
    let manifest = command.project.manifest()?;
    let code = resolved_code(&manifest, &command.project.network, &command.location)?;
    info!("{code}");
    Ok(code)
}

/// Resolve the imports of the program at `location` against the contracts deployed on `network`
/// and the network's aliases.
///
/// A location that is one of the deployed contracts is resolved as that contract. Any other
/// location, typically a script or transaction, is loaded on its own.
pub fn resolved_code(
    manifest: &ProjectManifestFile,
    network: &str,
    location: &str,
) -> Result<String> {
    let mut resolver = resolver_util::contracts_resolver(manifest, network)?;
    if resolver.program_by_location(location).is_none() {
        resolver
            .add(location, Address::default(), "", vec![])
            .map_err(resolver_util::describe)?;
    }
    resolver
        .resolve_imports()
        .map_err(resolver_util::describe)?;
    let id = resolver
        .program_by_location(location)
        .map(|program| program.id())
        .ok_or_else(|| anyhow!("`{location}` was not registered"))?;
    resolver
        .resolved_code(id)
        .ok_or_else(|| anyhow!("`{location}` was not registered"))
}
