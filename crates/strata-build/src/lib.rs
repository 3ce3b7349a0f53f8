#![deny(missing_docs)]
#![doc = "Hierarchy definitions, change detection and the instance builder."]

mod aggregate;
mod builder;
mod definition;
mod history;
mod instance;
mod manifest;
mod report;
mod serde;
mod topology;

pub use builder::{build, plan, BuildOptions, BuildPlan};
pub use definition::{
    ClusterConnection, ClusterNode, GeneratorKind, GraphDefinition, LeafParams, CLUSTER_PALETTE,
    DEFAULT_SEED,
};
pub use history::DefinitionHistory;
pub use instance::{AggregateGraph, ClusterMeta, ConnectionInstance, GraphInstance};
pub use manifest::BuildManifest;
pub use report::{
    write_edges_csv, write_nodes_csv, BuildMode, BuildReport, ConnectionSummary, DegradedLeaf,
};
pub use serde::{
    definition_from_json, definition_hash, definition_to_json, instance_to_json,
    snapshot_from_bytes, snapshot_to_bytes, DEFINITION_SCHEMA,
};
