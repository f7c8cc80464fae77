use crate::{imports::ParseError, program::Program};
use std::{fmt, io};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to load `{location}`: {source}")]
    Load {
        location: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse `{location}`: {source}")]
    Parse {
        location: String,
        #[source]
        source: ParseError,
    },

    #[error("import from {program} could not be found: {location}, make sure import path is correct")]
    UnresolvedImport { program: String, location: String },

    #[error("sorting is only possible for contracts, `{program}` is a script")]
    NotSortable { program: String },

    #[error(transparent)]
    CyclicImport(#[from] CyclicImportError),
}

/// Returned when contracts import one another in a cycle, which can never be deployed.
///
/// Every cycle found is reported, not only the first.
#[derive(Debug, Error)]
pub struct CyclicImportError {
    /// Each group is one strongly connected set of programs, in registration order.
    pub cycles: Vec<Vec<Program>>,
}

impl CyclicImportError {
    pub fn contract_names(&self) -> Vec<Vec<String>> {
        self.cycles
            .iter()
            .map(|cycle| cycle.iter().map(|p| p.name().to_string()).collect())
            .collect()
    }
}

impl fmt::Display for CyclicImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cycles = self
            .contract_names()
            .iter()
            .map(|names| format!("[{}]", names.join(", ")))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "contracts: import cycle(s) detected: [{cycles}]")
    }
}
