use flowkit::{
    manifest::ProjectManifestFile,
    ops::{flowkit_order::deployment_plan, flowkit_resolve::resolved_code},
};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn fixture(name: &str) -> ProjectManifestFile {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    ProjectManifestFile::from_dir(dir).unwrap()
}

#[test]
fn contracts_follow_their_imports() {
    let manifest = fixture("kitty-items");
    let plan = deployment_plan(&manifest, "emulator").unwrap();
    let order: Vec<(&str, &str)> = plan
        .iter()
        .map(|step| (step.name.as_str(), step.account_name.as_str()))
        .collect();
    assert_eq!(
        order,
        [
            ("NonFungibleToken", "emulator-account"),
            ("KittyItems", "emulator-account"),
            ("KittyMarket", "market"),
        ]
    );
    assert_eq!(plan[2].account_address.to_string(), "0x01cf0e2f2f715450");
}

#[test]
fn network_without_deployments_is_empty() {
    let manifest = fixture("kitty-items");
    assert!(deployment_plan(&manifest, "testnet").unwrap().is_empty());
}

#[test]
fn script_imports_are_rewritten_to_addresses() {
    let manifest = fixture("kitty-items");
    let code = resolved_code(&manifest, "emulator", "./scripts/get_fee.cdc").unwrap();
    assert_eq!(
        code,
        "import KittyMarket from 0x01cf0e2f2f715450\n\
         import FungibleToken from 0xee82856bf20e2aa6\n\
         \n\
         access(all) fun main(): UFix64 {\n    return KittyMarket.fee\n}\n"
    );
}

#[test]
fn deployed_contract_can_be_resolved() {
    let manifest = fixture("kitty-items");
    let code = resolved_code(&manifest, "emulator", "./contracts/KittyItems.cdc").unwrap();
    assert!(code.starts_with("import NonFungibleToken from 0xf8d6e0586b0a20c7\n"));
}

#[test]
fn script_import_unavailable_on_network() {
    // FungibleToken is aliased on testnet but KittyMarket is not deployed there.
    let manifest = fixture("kitty-items");
    let err = resolved_code(&manifest, "testnet", "./scripts/get_fee.cdc").unwrap_err();
    assert_eq!(
        err.to_string(),
        "import from ./scripts/get_fee.cdc could not be found: ./contracts/KittyMarket.cdc, \
         make sure import path is correct"
    );
}

#[test]
fn cycles_are_reported() {
    let manifest = fixture("cycle");
    let err = deployment_plan(&manifest, "emulator").unwrap_err();
    assert_eq!(
        err.to_string(),
        "import cycle(s) detected between contracts:\n  Alice <-> Bob"
    );
}

#[test]
fn manifest_is_found_from_nested_directory() {
    let nested = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("kitty-items")
        .join("contracts");
    let manifest = ProjectManifestFile::from_dir(nested).unwrap();
    assert_eq!(manifest.project.name, "kitty-items");
    assert!(manifest.path().ends_with("kitty-items/Flowkit.toml"));
}

#[test]
fn missing_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let err = ProjectManifestFile::from_dir(dir.path()).unwrap_err();
    assert!(err.to_string().starts_with("could not find `Flowkit.toml`"));
}
