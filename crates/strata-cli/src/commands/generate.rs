use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use log::{info, warn};
use serde::Deserialize;

use strata_build::{
    build, definition_from_json, instance_to_json, write_edges_csv, write_nodes_csv,
    BuildManifest, BuildOptions,
};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Definition JSON describing the cluster hierarchy.
    #[arg(long)]
    pub definition: PathBuf,
    /// Output directory for the build artefacts.
    #[arg(long)]
    pub out: PathBuf,
    /// Optional YAML run configuration; flags override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Master seed overriding the definition's seed.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Regenerate every leaf regardless of change tokens.
    #[arg(long)]
    pub full: bool,
}

/// YAML run configuration; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateConfig {
    /// Master seed override.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Force a full rebuild.
    #[serde(default)]
    pub full: bool,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&args.out)?;
    let mut definition = definition_from_json(&fs::read_to_string(&args.definition)?)?;

    let config = match &args.config {
        Some(path) => serde_yaml::from_str::<GenerateConfig>(&fs::read_to_string(path)?)?,
        None => GenerateConfig::default(),
    };
    if let Some(seed) = args.seed.or(config.seed) {
        definition.set_seed(seed);
    }
    let force_full = args.full || config.full;

    let (instance, report) = build(&definition, None, BuildOptions { force_full })?;
    info!(
        "built {} nodes / {} edges across {} leaves",
        report.node_count,
        report.edge_count,
        report.regenerated.len()
    );
    if report.has_degraded_leaves() {
        warn!("{} leaves degraded to empty graphs", report.degraded.len());
    }

    fs::write(args.out.join("instance.json"), instance_to_json(&instance)?)?;
    report.write(&args.out.join("report.json"))?;
    write_nodes_csv(&instance, &args.out.join("nodes.csv"))?;
    write_edges_csv(&instance, &args.out.join("edges.csv"))?;

    let artifacts = vec![
        args.out.join("instance.json"),
        args.out.join("report.json"),
        args.out.join("nodes.csv"),
        args.out.join("edges.csv"),
    ];
    let manifest = BuildManifest::new(instance.seed, report, artifacts);
    manifest.write(&args.out.join("manifest.json"))?;

    // Keep the input next to its artefacts for reproducibility.
    fs::copy(&args.definition, args.out.join("definition.json")).ok();

    Ok(())
}
