use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use serde_json::json;

use strata_build::{
    definition_from_json, definition_hash, definition_to_json, snapshot_from_bytes,
    snapshot_to_bytes,
};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Definition JSON to validate.
    #[arg(long)]
    pub definition: PathBuf,
}

pub fn run(args: &ValidateArgs) -> Result<(), Box<dyn Error>> {
    let definition = definition_from_json(&fs::read_to_string(&args.definition)?)?;
    let hash = definition_hash(&definition)?;

    // Both serialized forms must survive a round-trip unchanged.
    let json_copy = definition_from_json(&definition_to_json(&definition)?)?;
    let snapshot_copy = snapshot_from_bytes(&snapshot_to_bytes(&definition)?)?;
    let json_roundtrip = definition_hash(&json_copy)? == hash;
    let snapshot_roundtrip = definition_hash(&snapshot_copy)? == hash;

    let leaves = definition
        .clusters()
        .iter()
        .filter(|cluster| cluster.is_leaf())
        .count();
    let summary = json!({
        "definition": args.definition.display().to_string(),
        "definition_hash": hash,
        "clusters": definition.clusters().len(),
        "leaves": leaves,
        "connections": definition.connections().len(),
        "json_roundtrip": json_roundtrip,
        "snapshot_roundtrip": snapshot_roundtrip,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if !json_roundtrip || !snapshot_roundtrip {
        return Err("definition did not survive a serialization round-trip".into());
    }
    Ok(())
}
