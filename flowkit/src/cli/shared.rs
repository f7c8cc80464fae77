//! Sets of arguments that are shared between commands.
use crate::manifest::{ProjectManifestFile, DEFAULT_NETWORK};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Project-related options.
#[derive(Args, Debug, Clone)]
pub struct Project {
    /// Path to the project, if not specified, current working directory will be used.
    #[clap(short, long)]
    pub path: Option<String>,
    /// The network whose deployments and aliases are used.
    #[clap(short, long, env = "FLOWKIT_NETWORK", default_value = DEFAULT_NETWORK)]
    pub network: String,
}

impl Project {
    /// Load the manifest of the project at `path`, or of the project containing the current
    /// working directory.
    pub fn manifest(&self) -> Result<ProjectManifestFile> {
        let dir = match &self.path {
            Some(path) => PathBuf::from(path),
            None => std::env::current_dir()?,
        };
        ProjectManifestFile::from_dir(dir)
    }
}
