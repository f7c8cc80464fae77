use crate::manifest::ProjectManifestFile;
use anyhow::{Context, Result};
use flowkit_resolver::{FsLoader, ImportResolver, ResolveError};

/// Register every contract deployed on `network` with a new resolver, in manifest order.
///
/// Contract sources are loaded relative to the manifest directory, and contracts aliased on the
/// network are resolved to their aliases.
pub(crate) fn contracts_resolver(
    manifest: &ProjectManifestFile,
    network: &str,
) -> Result<ImportResolver<FsLoader>> {
    let aliases = manifest.alias_table(network);
    let mut resolver = ImportResolver::new(FsLoader::new(manifest.dir()), aliases);
    for deployment in manifest.deployments(network)? {
        resolver
            .add(
                &deployment.source,
                deployment.account_address,
                &deployment.account_name,
                deployment.args,
            )
            .map_err(describe)
            .with_context(|| format!("failed to register contract `{}`", deployment.name))?;
    }
    Ok(resolver)
}

/// Convert a resolution error into one fit for the user, listing import cycles one per line.
pub(crate) fn describe(err: ResolveError) -> anyhow::Error {
    match err {
        ResolveError::CyclicImport(cyclic) => {
            let cycles = cyclic
                .contract_names()
                .iter()
                .map(|names| format!("  {}", names.join(" <-> ")))
                .collect::<Vec<_>>()
                .join("\n");
            anyhow::anyhow!("import cycle(s) detected between contracts:\n{cycles}")
        }
        err => err.into(),
    }
}
