//! Resolving imports between Cadence programs and ordering contracts for deployment.
//!
//! Programs are registered with an [ImportResolver] by location. Each program's imports are then
//! resolved either to another registered program or to an external address through the
//! [AliasTable]. Contracts can be sorted into a deployment order in which every contract follows
//! all of the contracts it imports.

pub mod address;
pub mod error;
mod graph;
pub mod imports;
pub mod loader;
mod program;
mod resolver;

pub use address::{Address, AliasTable};
pub use error::{CyclicImportError, ResolveError, Result};
pub use graph::{dependency_graph, deployment_order, Graph, NodeIx};
pub use imports::{CadenceImports, ImportExtractor, ParseError, SourceSummary};
pub use loader::{FsLoader, Loader, MemoryLoader};
#[doc(inline)]
pub use program::*;
pub use resolver::ImportResolver;
