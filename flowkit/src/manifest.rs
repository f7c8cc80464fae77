//! The `Flowkit.toml` project manifest.

use anyhow::{anyhow, bail, Context, Result};
use flowkit_resolver::{Address, AliasTable};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

pub const MANIFEST_FILE_NAME: &str = "Flowkit.toml";
pub const DEFAULT_NETWORK: &str = "emulator";

/// Deployments per account, in the order they were declared.
pub type AccountDeployments = IndexMap<String, Vec<DeploymentEntry>>;

/// A direct mapping to a `Flowkit.toml`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectManifest {
    pub project: Project,
    #[serde(default)]
    pub contracts: BTreeMap<String, Contract>,
    #[serde(default)]
    pub accounts: BTreeMap<String, Account>,
    /// Network name to the contracts deployed to each account on that network.
    #[serde(default)]
    pub deployments: BTreeMap<String, AccountDeployments>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Project {
    pub name: String,
}

/// A contract declaration.
///
/// A contract may be declared with just its source:
///
/// ```toml
/// Hello = "./contracts/Hello.cdc"
/// ```
///
/// or along with the addresses it already lives at on some networks:
///
/// ```toml
/// FungibleToken = { source = "./contracts/FungibleToken.cdc", aliases = { testnet = "0x9a0766d93b6608b7" } }
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Contract {
    Simple(String),
    Detailed(ContractDetails),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ContractDetails {
    pub source: String,
    /// Network name to the address the contract is already deployed at.
    #[serde(default)]
    pub aliases: BTreeMap<String, Address>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Account {
    pub address: Address,
}

/// A contract deployed to an account, either by name alone or with initializer arguments.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum DeploymentEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        args: Vec<serde_json::Value>,
    },
}

/// A single contract to deploy, with every reference into the manifest resolved.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ContractDeployment {
    pub name: String,
    pub source: String,
    pub account_name: String,
    pub account_address: Address,
    pub args: Vec<serde_json::Value>,
}

/// A [ProjectManifest] that was deserialized from a file at a particular path.
#[derive(Clone, Debug)]
pub struct ProjectManifestFile {
    manifest: ProjectManifest,
    path: PathBuf,
}

impl Contract {
    pub fn source(&self) -> &str {
        match self {
            Contract::Simple(source) => source,
            Contract::Detailed(details) => &details.source,
        }
    }

    pub fn alias(&self, network: &str) -> Option<Address> {
        match self {
            Contract::Simple(_) => None,
            Contract::Detailed(details) => details.aliases.get(network).copied(),
        }
    }
}

impl DeploymentEntry {
    pub fn name(&self) -> &str {
        match self {
            DeploymentEntry::Name(name) | DeploymentEntry::Detailed { name, .. } => name,
        }
    }

    pub fn args(&self) -> &[serde_json::Value] {
        match self {
            DeploymentEntry::Name(_) => &[],
            DeploymentEntry::Detailed { args, .. } => args,
        }
    }
}

impl ProjectManifest {
    /// Parse and validate a manifest from its TOML contents.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(contents).context("failed to parse manifest")?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate the manifest, checking that names are valid and that every deployment refers to
    /// a declared account and contract.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.project.name, "project name")?;
        for name in self.contracts.keys() {
            validate_name(name, "contract name")?;
        }
        for name in self.accounts.keys() {
            validate_name(name, "account name")?;
        }
        for (network, accounts) in &self.deployments {
            for (account, entries) in accounts {
                if !self.accounts.contains_key(account) {
                    bail!("deployment on network `{network}` refers to unknown account `{account}`");
                }
                for entry in entries {
                    let contract = self.contracts.get(entry.name()).ok_or_else(|| {
                        anyhow!(
                            "deployment on network `{network}` refers to unknown contract `{}`",
                            entry.name()
                        )
                    })?;
                    if let Some(address) = contract.alias(network) {
                        bail!(
                            "contract `{}` is aliased to {address} on network `{network}` \
                            and cannot also be deployed there",
                            entry.name()
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// The alias table for `network`: the source of every contract aliased on that network to
    /// the address it is aliased to.
    pub fn alias_table(&self, network: &str) -> AliasTable {
        self.contracts
            .values()
            .filter_map(|contract| Some((contract.source().to_string(), contract.alias(network)?)))
            .collect()
    }

    /// Every contract deployed on `network`, in the order accounts and their contracts are
    /// declared.
    pub fn deployments(&self, network: &str) -> Result<Vec<ContractDeployment>> {
        let Some(accounts) = self.deployments.get(network) else {
            return Ok(vec![]);
        };
        let mut deployments = vec![];
        for (account_name, entries) in accounts {
            let account = self
                .accounts
                .get(account_name)
                .ok_or_else(|| anyhow!("unknown account `{account_name}`"))?;
            for entry in entries {
                let contract = self
                    .contracts
                    .get(entry.name())
                    .ok_or_else(|| anyhow!("unknown contract `{}`", entry.name()))?;
                deployments.push(ContractDeployment {
                    name: entry.name().to_string(),
                    source: contract.source().to_string(),
                    account_name: account_name.clone(),
                    account_address: account.address,
                    args: entry.args().to_vec(),
                });
            }
        }
        Ok(deployments)
    }
}

impl ProjectManifestFile {
    /// Given a path to a `Flowkit.toml`, read it and construct a `ProjectManifestFile`.
    ///
    /// The resulting path is canonicalized.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path = path
            .canonicalize()
            .with_context(|| format!("failed to find manifest at {}", path.display()))?;
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read manifest at {}", path.display()))?;
        let manifest = ProjectManifest::from_toml_str(&contents)
            .with_context(|| format!("invalid manifest at {}", path.display()))?;
        Ok(Self { manifest, path })
    }

    /// Read the manifest from the `Flowkit.toml` in the given directory or the nearest parent
    /// directory containing one.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let manifest_dir = find_manifest_dir(dir).ok_or_else(|| manifest_file_missing(dir))?;
        Self::from_file(manifest_dir.join(MANIFEST_FILE_NAME))
    }

    /// The path to the `Flowkit.toml` from which this manifest was loaded.
    ///
    /// This will always be a canonical path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory containing the `Flowkit.toml`. Contract sources are relative to it.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }
}

impl std::ops::Deref for ProjectManifestFile {
    type Target = ProjectManifest;

    fn deref(&self) -> &Self::Target {
        &self.manifest
    }
}

/// Continually go up in the file tree until a directory containing a `Flowkit.toml` is found.
pub fn find_manifest_dir(starter_path: &Path) -> Option<PathBuf> {
    let mut path = fs::canonicalize(starter_path).ok()?;
    loop {
        if path.join(MANIFEST_FILE_NAME).is_file() {
            return Some(path);
        }
        if !path.pop() {
            return None;
        }
    }
}

/// Format an error message for an absent `Flowkit.toml`.
pub fn manifest_file_missing(dir: &Path) -> anyhow::Error {
    anyhow!(
        "could not find `{}` in `{}` or any parent directory",
        MANIFEST_FILE_NAME,
        dir.display()
    )
}

fn validate_name(name: &str, use_case: &str) -> Result<()> {
    if name.is_empty() {
        bail!("{use_case} cannot be empty");
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        bail!("invalid character `{c}` in {use_case}: `{name}`");
    }
    Ok(())
}
