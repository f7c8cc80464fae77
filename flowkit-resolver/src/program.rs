use crate::{address::Address, imports::SourceSummary};
use indexmap::IndexMap;
use std::fmt;

/// Identifies a program by the order in which it was registered with the resolver.
///
/// The ID is also the tie-break key when sorting by deployment order.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ProgramId(pub usize);

/// Whether a program declares a contract or is a script.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum ProgramKind {
    Contract,
    Script,
}

/// A single Cadence source unit along with where it is to be deployed and how its imports
/// were resolved.
#[derive(Clone, Debug)]
pub struct Program {
    id: ProgramId,
    location: String,
    name: Option<String>,
    kind: ProgramKind,
    code: String,
    account_address: Address,
    account_name: String,
    args: Vec<serde_json::Value>,
    import_locations: Vec<String>,
    /// Import location to the registered program it resolved to.
    pub(crate) dependencies: IndexMap<String, ProgramId>,
    /// Import location to the external address it resolved to.
    pub(crate) aliases: IndexMap<String, Address>,
}

impl Program {
    pub(crate) fn new(
        id: ProgramId,
        location: String,
        code: String,
        summary: SourceSummary,
        account_address: Address,
        account_name: String,
        args: Vec<serde_json::Value>,
    ) -> Self {
        let SourceSummary {
            kind,
            name,
            imports,
        } = summary;
        Self {
            id,
            location,
            name,
            kind,
            code,
            account_address,
            account_name,
            args,
            import_locations: imports,
            dependencies: IndexMap::new(),
            aliases: IndexMap::new(),
        }
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// The name of the declared contract, or the location for programs that declare none.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.location)
    }

    pub fn kind(&self) -> ProgramKind {
        self.kind
    }

    pub fn is_contract(&self) -> bool {
        self.kind == ProgramKind::Contract
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn account_address(&self) -> Address {
        self.account_address
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    pub fn args(&self) -> &[serde_json::Value] {
        &self.args
    }

    /// Import locations in the order they appear in the source.
    pub fn import_locations(&self) -> &[String] {
        &self.import_locations
    }

    /// Imports resolved to other registered programs. Empty until imports are resolved.
    pub fn dependencies(&self) -> &IndexMap<String, ProgramId> {
        &self.dependencies
    }

    /// Imports resolved through the alias table. Empty until imports are resolved.
    pub fn aliases(&self) -> &IndexMap<String, Address> {
        &self.aliases
    }

    pub(crate) fn clear_resolution(&mut self) {
        self.dependencies.clear();
        self.aliases.clear();
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
