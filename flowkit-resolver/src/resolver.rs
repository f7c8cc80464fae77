use crate::{
    address::{Address, AliasTable},
    error::{CyclicImportError, ResolveError, Result},
    graph::{dependency_graph, deployment_order},
    imports::{CadenceImports, ImportExtractor},
    loader::Loader,
    program::{Program, ProgramId},
};
use indexmap::IndexMap;
use std::{collections::HashMap, io};

/// Contains the collection of programs being resolved together and the logic for resolving
/// their imports.
///
/// Programs are registered with [ImportResolver::add]. Their imports are resolved with
/// [ImportResolver::resolve_imports], and contracts can be put in deployment order with
/// [ImportResolver::sort].
pub struct ImportResolver<L, X = CadenceImports> {
    loader: L,
    extractor: X,
    aliases: AliasTable,
    programs: Vec<Program>,
    /// The position of each program within `programs`, indexed by `ProgramId`.
    positions: Vec<usize>,
    programs_by_location: HashMap<String, ProgramId>,
}

impl<L: Loader> ImportResolver<L> {
    pub fn new(loader: L, aliases: AliasTable) -> Self {
        Self::with_extractor(loader, CadenceImports, aliases)
    }
}

impl<L: Loader, X: ImportExtractor> ImportResolver<L, X> {
    pub fn with_extractor(loader: L, extractor: X, aliases: AliasTable) -> Self {
        Self {
            loader,
            extractor,
            aliases,
            programs: vec![],
            positions: vec![],
            programs_by_location: HashMap::new(),
        }
    }

    /// All registered programs. In registration order until sorted, in deployment order after.
    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn program(&self, id: ProgramId) -> Option<&Program> {
        self.positions.get(id.0).map(|&pos| &self.programs[pos])
    }

    pub fn program_by_location(&self, location: &str) -> Option<&Program> {
        self.programs_by_location
            .get(location)
            .and_then(|&id| self.program(id))
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Load the program at `location` and register it.
    ///
    /// Imports are only extracted here, they are not resolved until
    /// [ImportResolver::resolve_imports].
    pub fn add(
        &mut self,
        location: &str,
        account_address: Address,
        account_name: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<&Program> {
        let load_err = |source| ResolveError::Load {
            location: location.to_string(),
            source,
        };
        let bytes = self.loader.load(location).map_err(load_err)?;
        let code = String::from_utf8(bytes)
            .map_err(|e| load_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        let summary = self
            .extractor
            .extract(&code)
            .map_err(|source| ResolveError::Parse {
                location: location.to_string(),
                source,
            })?;

        let id = ProgramId(self.positions.len());
        let program = Program::new(
            id,
            location.to_string(),
            code,
            summary,
            account_address,
            account_name.to_string(),
            args,
        );
        tracing::debug!(
            "registered {} `{}` from {} with {} import(s)",
            if program.is_contract() { "contract" } else { "script" },
            program.name(),
            location,
            program.import_locations().len(),
        );

        if let Some(prev) = self.programs_by_location.insert(location.to_string(), id) {
            tracing::debug!(
                "{location} was already registered as program {}, imports now resolve to program {}",
                prev.0,
                id.0
            );
        }
        self.positions.push(self.programs.len());
        self.programs.push(program);
        Ok(&self.programs[self.programs.len() - 1])
    }

    /// Resolve every import of every program, in registration order.
    ///
    /// An import resolves to a registered program with that location if there is one, otherwise
    /// to the address the alias table holds for it. The first import that resolves to neither
    /// fails the whole pass.
    ///
    /// Every call starts from scratch, so calling this more than once is harmless.
    pub fn resolve_imports(&mut self) -> Result<()> {
        for program in &mut self.programs {
            program.clear_resolution();
        }

        for &pos in &self.positions {
            let program = &self.programs[pos];
            let mut dependencies = IndexMap::new();
            let mut aliases = IndexMap::new();
            for location in program.import_locations() {
                if let Some(&dep) = self.programs_by_location.get(location) {
                    dependencies.insert(location.clone(), dep);
                } else if let Some(address) = self.aliases.get(location) {
                    aliases.insert(location.clone(), address);
                } else {
                    return Err(ResolveError::UnresolvedImport {
                        program: program.name().to_string(),
                        location: location.clone(),
                    });
                }
            }
            tracing::trace!(
                "{}: {} dependencies, {} aliases",
                program.name(),
                dependencies.len(),
                aliases.len()
            );

            let program = &mut self.programs[pos];
            program.dependencies = dependencies;
            program.aliases = aliases;
        }

        Ok(())
    }

    /// Sort contracts by deployment order.
    ///
    /// Any imported contract must be deployed before the contract importing it. Contracts with no
    /// ordering between them keep the order in which they were registered. Only applicable when
    /// every registered program is a contract.
    pub fn sort(&mut self) -> Result<&[Program]> {
        if let Some(script) = self.programs.iter().find(|p| !p.is_contract()) {
            return Err(ResolveError::NotSortable {
                program: script.name().to_string(),
            });
        }

        self.resolve_imports()?;

        let graph = dependency_graph(&self.programs);
        let order = deployment_order(&graph).map_err(|cycles| CyclicImportError {
            cycles: cycles
                .iter()
                .map(|cycle| {
                    cycle
                        .iter()
                        .filter_map(|&id| self.program(id).cloned())
                        .collect()
                })
                .collect(),
        })?;

        let mut by_id: Vec<Option<Program>> = (0..self.positions.len()).map(|_| None).collect();
        for program in std::mem::take(&mut self.programs) {
            let ix = program.id().0;
            by_id[ix] = Some(program);
        }
        self.programs = order
            .iter()
            .filter_map(|id| by_id[id.0].take())
            .collect();
        for (pos, program) in self.programs.iter().enumerate() {
            self.positions[program.id().0] = pos;
        }

        tracing::debug!(
            "deployment order: {}",
            self.programs
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(&self.programs)
    }

    /// The code of the given program with every resolved import rewritten to import from the
    /// address it resolved to.
    ///
    /// Imports of registered programs use the account that program is deployed to.
    pub fn resolved_code(&self, id: ProgramId) -> Option<String> {
        let program = self.program(id)?;
        let mut addresses: IndexMap<String, Address> = program
            .dependencies()
            .iter()
            .filter_map(|(location, &dep)| {
                self.program(dep)
                    .map(|dep| (location.clone(), dep.account_address()))
            })
            .collect();
        addresses.extend(
            program
                .aliases()
                .iter()
                .map(|(location, &address)| (location.clone(), address)),
        );
        Some(self.extractor.replace_imports(program.code(), &addresses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{loader::MemoryLoader, program::ProgramKind};

    const ACCOUNT: &str = "emulator-account";

    fn address(s: &str) -> Address {
        s.parse().unwrap()
    }

    fn contract(name: &str, imports: &[&str]) -> String {
        let mut code = String::new();
        for import in imports {
            code.push_str(&format!("import Dep from \"{import}\"\n"));
        }
        code.push_str(&format!("\naccess(all) contract {name} {{}}\n"));
        code
    }

    fn resolver(sources: &[(&str, String)], aliases: AliasTable) -> ImportResolver<MemoryLoader> {
        let loader = sources
            .iter()
            .fold(MemoryLoader::new(), |loader, (loc, code)| {
                loader.with(*loc, code.as_str())
            });
        let mut resolver = ImportResolver::new(loader, aliases);
        for (loc, _) in sources {
            resolver.add(loc, address("0x01"), ACCOUNT, vec![]).unwrap();
        }
        resolver
    }

    fn names(programs: &[Program]) -> Vec<&str> {
        programs.iter().map(|p| p.name()).collect()
    }

    #[test]
    fn add_assigns_registration_index() {
        let r = resolver(
            &[
                ("./A.cdc", contract("A", &[])),
                ("./B.cdc", contract("B", &["./A.cdc"])),
            ],
            AliasTable::default(),
        );
        let b = r.program_by_location("./B.cdc").unwrap();
        assert_eq!(b.id(), ProgramId(1));
        assert_eq!(b.kind(), ProgramKind::Contract);
        assert_eq!(b.account_name(), ACCOUNT);
        assert_eq!(b.import_locations(), ["./A.cdc".to_string()]);
        assert!(b.dependencies().is_empty());
    }

    #[test]
    fn add_missing_source_is_load_error() {
        let mut r = ImportResolver::new(MemoryLoader::new(), AliasTable::default());
        let err = r
            .add("./Missing.cdc", address("0x01"), ACCOUNT, vec![])
            .unwrap_err();
        assert!(matches!(err, ResolveError::Load { location, .. } if location == "./Missing.cdc"));
        assert!(r.programs().is_empty());
    }

    #[test]
    fn add_malformed_source_is_parse_error() {
        let loader = MemoryLoader::new().with("./A.cdc", "import A from\ncontract A {}");
        let mut r = ImportResolver::new(loader, AliasTable::default());
        let err = r.add("./A.cdc", address("0x01"), ACCOUNT, vec![]).unwrap_err();
        assert!(matches!(err, ResolveError::Parse { .. }));
    }

    #[test]
    fn linear_chain() {
        let mut r = resolver(
            &[
                ("./C.cdc", contract("C", &[])),
                ("./B.cdc", contract("B", &["./C.cdc"])),
                ("./A.cdc", contract("A", &["./B.cdc"])),
            ],
            AliasTable::default(),
        );
        assert_eq!(names(r.sort().unwrap()), ["C", "B", "A"]);
    }

    #[test]
    fn reverse_chain_is_reordered() {
        let mut r = resolver(
            &[
                ("./A.cdc", contract("A", &["./B.cdc"])),
                ("./B.cdc", contract("B", &["./C.cdc"])),
                ("./C.cdc", contract("C", &[])),
            ],
            AliasTable::default(),
        );
        assert_eq!(names(r.sort().unwrap()), ["C", "B", "A"]);
        // Lookups still work once the programs have moved.
        assert_eq!(r.program(ProgramId(0)).unwrap().name(), "A");
        assert_eq!(r.program_by_location("./C.cdc").unwrap().id(), ProgramId(2));
    }

    #[test]
    fn unrelated_contracts_keep_registration_order() {
        let mut r = resolver(
            &[
                ("./A.cdc", contract("A", &["./D.cdc"])),
                ("./B.cdc", contract("B", &[])),
                ("./C.cdc", contract("C", &[])),
                ("./D.cdc", contract("D", &[])),
            ],
            AliasTable::default(),
        );
        assert_eq!(names(r.sort().unwrap()), ["B", "C", "D", "A"]);
    }

    #[test]
    fn sort_is_deterministic() {
        let sources = [
            ("./A.cdc", contract("A", &["./C.cdc", "./B.cdc"])),
            ("./B.cdc", contract("B", &["./E.cdc"])),
            ("./C.cdc", contract("C", &["./E.cdc"])),
            ("./D.cdc", contract("D", &[])),
            ("./E.cdc", contract("E", &[])),
        ];
        let first: Vec<String> = names(resolver(&sources, AliasTable::default()).sort().unwrap())
            .into_iter()
            .map(String::from)
            .collect();
        for _ in 0..10 {
            let mut r = resolver(&sources, AliasTable::default());
            assert_eq!(names(r.sort().unwrap()), first);
        }
        assert_eq!(first, ["D", "E", "B", "C", "A"]);
    }

    #[test]
    fn self_import_is_a_cycle() {
        let mut r = resolver(
            &[("./A.cdc", contract("A", &["./A.cdc"]))],
            AliasTable::default(),
        );
        match r.sort().unwrap_err() {
            ResolveError::CyclicImport(err) => {
                assert_eq!(err.contract_names(), vec![vec!["A".to_string()]]);
            }
            err => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn disjoint_cycles_are_all_reported() {
        let mut r = resolver(
            &[
                ("./A.cdc", contract("A", &["./B.cdc"])),
                ("./B.cdc", contract("B", &["./A.cdc"])),
                ("./C.cdc", contract("C", &[])),
                ("./D.cdc", contract("D", &["./E.cdc"])),
                ("./E.cdc", contract("E", &["./D.cdc"])),
            ],
            AliasTable::default(),
        );
        let err = r.sort().unwrap_err();
        assert_eq!(
            err.to_string(),
            "contracts: import cycle(s) detected: [[A, B], [D, E]]"
        );
        // Nothing is reordered on failure.
        assert_eq!(names(r.programs()), ["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn alias_short_circuits_graph() {
        let aliases = AliasTable::parse([("Foo", "0x01")]).unwrap();
        let mut r = resolver(&[("./A.cdc", contract("A", &["Foo"]))], aliases);
        r.resolve_imports().unwrap();
        let a = &r.programs()[0];
        assert_eq!(a.aliases().get("Foo"), Some(&address("0x01")));
        assert!(a.dependencies().is_empty());
        assert_eq!(names(r.sort().unwrap()), ["A"]);
    }

    #[test]
    fn registered_program_takes_precedence_over_alias() {
        let aliases = AliasTable::parse([("./B.cdc", "0x02")]).unwrap();
        let mut r = resolver(
            &[
                ("./A.cdc", contract("A", &["./B.cdc"])),
                ("./B.cdc", contract("B", &[])),
            ],
            aliases,
        );
        r.resolve_imports().unwrap();
        let a = r.program_by_location("./A.cdc").unwrap();
        assert_eq!(a.dependencies().get("./B.cdc"), Some(&ProgramId(1)));
        assert!(a.aliases().is_empty());
    }

    #[test]
    fn unresolved_import_fails_fast_in_registration_order() {
        let mut r = resolver(
            &[
                ("./B.cdc", contract("B", &["Y"])),
                ("./A.cdc", contract("A", &["X"])),
            ],
            AliasTable::default(),
        );
        match r.resolve_imports().unwrap_err() {
            ResolveError::UnresolvedImport { program, location } => {
                assert_eq!(program, "B");
                assert_eq!(location, "Y");
            }
            err => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn mixed_kinds_are_not_sortable() {
        let loader = MemoryLoader::new()
            .with("./A.cdc", contract("A", &["./Missing.cdc"]))
            .with("./main.cdc", "access(all) fun main() {}");
        let mut r = ImportResolver::new(loader, AliasTable::default());
        r.add("./A.cdc", address("0x01"), ACCOUNT, vec![]).unwrap();
        r.add("./main.cdc", address("0x01"), ACCOUNT, vec![]).unwrap();
        // The unresolvable import would fail resolution, so this proves no resolution happened.
        match r.sort().unwrap_err() {
            ResolveError::NotSortable { program } => assert_eq!(program, "./main.cdc"),
            err => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn resolve_imports_is_idempotent() {
        let mut r = resolver(
            &[
                ("./A.cdc", contract("A", &[])),
                ("./B.cdc", contract("B", &["./A.cdc"])),
            ],
            AliasTable::default(),
        );
        r.resolve_imports().unwrap();
        r.resolve_imports().unwrap();
        let b = r.program_by_location("./B.cdc").unwrap();
        assert_eq!(b.dependencies().len(), 1);
        assert_eq!(names(r.sort().unwrap()), ["A", "B"]);
        assert_eq!(names(r.sort().unwrap()), ["A", "B"]);
    }

    #[test]
    fn every_import_resolved_exactly_once() {
        let aliases = AliasTable::parse([("Foo", "0x0a")]).unwrap();
        let mut r = resolver(
            &[
                ("./A.cdc", contract("A", &[])),
                ("./B.cdc", contract("B", &["./A.cdc", "Foo"])),
            ],
            aliases,
        );
        r.resolve_imports().unwrap();
        for program in r.programs() {
            for location in program.import_locations() {
                let as_dep = program.dependencies().contains_key(location);
                let as_alias = program.aliases().contains_key(location);
                assert!(as_dep ^ as_alias, "{location} resolved {as_dep} {as_alias}");
            }
        }
    }

    #[test]
    fn resolved_code_uses_deployment_accounts_and_aliases() {
        let loader = MemoryLoader::new()
            .with("./A.cdc", contract("A", &[]))
            .with(
                "./main.cdc",
                "import A from \"./A.cdc\"\nimport Foo from \"Foo\"\n\naccess(all) fun main() {}\n",
            );
        let aliases = AliasTable::parse([("Foo", "0x0a")]).unwrap();
        let mut r = ImportResolver::new(loader, aliases);
        r.add("./A.cdc", address("0xf8d6e0586b0a20c7"), ACCOUNT, vec![])
            .unwrap();
        let script = r
            .add("./main.cdc", Address::default(), "", vec![])
            .unwrap()
            .id();
        r.resolve_imports().unwrap();
        assert_eq!(
            r.resolved_code(script).unwrap(),
            "import A from 0xf8d6e0586b0a20c7\nimport Foo from 0x000000000000000a\n\naccess(all) fun main() {}\n"
        );
    }
}
