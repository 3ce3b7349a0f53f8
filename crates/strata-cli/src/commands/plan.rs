use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use serde_json::json;

use strata_build::{definition_from_json, plan, BuildMode};
use strata_core::ClusterId;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Definition JSON describing the next build.
    #[arg(long)]
    pub definition: PathBuf,
    /// Definition JSON an existing instance was built from.
    #[arg(long)]
    pub previous: Option<PathBuf>,
    /// Plan a full rebuild even when tokens match.
    #[arg(long)]
    pub full: bool,
}

pub fn run(args: &PlanArgs) -> Result<(), Box<dyn Error>> {
    let definition = definition_from_json(&fs::read_to_string(&args.definition)?)?;
    let previous_tokens = match &args.previous {
        Some(path) => Some(definition_from_json(&fs::read_to_string(path)?)?.tokens()),
        None => None,
    };

    let build_plan = plan(&definition, previous_tokens.as_ref(), args.full)?;
    let summary = json!({
        "mode": match build_plan.mode {
            BuildMode::Full => "full",
            BuildMode::Incremental => "incremental",
        },
        "regenerate": raw_ids(&build_plan.regenerate),
        "reuse": raw_ids(&build_plan.reuse),
        "remove": raw_ids(&build_plan.remove),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn raw_ids(ids: &[ClusterId]) -> Vec<u64> {
    ids.iter().map(|id| id.as_raw()).collect()
}
