//! Resolving Cadence contract imports and planning contract deployments for a `Flowkit.toml`
//! project.

pub mod cli;
pub mod manifest;
pub mod ops;
