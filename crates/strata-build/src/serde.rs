//! Serialization surfaces: definition persistence, snapshots, exports.

use serde::Serialize;
use sha2::{Digest, Sha256};

use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::SchemaVersion;

use crate::definition::GraphDefinition;
use crate::instance::GraphInstance;

/// Newest definition schema this build understands.
pub const DEFINITION_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Serializes a definition to pretty JSON for persistence.
pub fn definition_to_json(definition: &GraphDefinition) -> Result<String, StrataError> {
    serde_json::to_string_pretty(definition).map_err(|err| {
        StrataError::Serde(ErrorInfo::new("definition-serialize", err.to_string()))
    })
}

/// Restores a definition from persisted JSON.
///
/// The payload's schema version must not be newer than what this build
/// understands; older payloads deserialize through serde defaults.
pub fn definition_from_json(json: &str) -> Result<GraphDefinition, StrataError> {
    let definition: GraphDefinition = serde_json::from_str(json).map_err(|err| {
        StrataError::Serde(ErrorInfo::new("definition-parse", err.to_string()))
    })?;
    if definition.schema_version > DEFINITION_SCHEMA {
        return Err(StrataError::Serde(
            ErrorInfo::new("schema-too-new", "definition written by a newer schema")
                .with_context("payload", definition.schema_version.to_string())
                .with_hint("upgrade before opening this definition"),
        ));
    }
    definition.validate()?;
    Ok(definition)
}

/// Serializes a definition to a compact binary snapshot.
///
/// Snapshots back the undo history; `bincode` keeps them cheap to take on
/// every edit. The generator kind and parameters are plain values, so they
/// round-trip losslessly.
pub fn snapshot_to_bytes(definition: &GraphDefinition) -> Result<Vec<u8>, StrataError> {
    bincode::serialize(definition).map_err(|err| {
        StrataError::Serde(ErrorInfo::new("snapshot-serialize", err.to_string()))
    })
}

/// Restores a definition from a binary snapshot.
pub fn snapshot_from_bytes(bytes: &[u8]) -> Result<GraphDefinition, StrataError> {
    bincode::deserialize(bytes)
        .map_err(|err| StrataError::Serde(ErrorInfo::new("snapshot-parse", err.to_string())))
}

/// Computes the canonical hash of a definition.
///
/// The hash is taken over the binary snapshot encoding, which covers every
/// persisted field in a stable order.
pub fn definition_hash(definition: &GraphDefinition) -> Result<String, StrataError> {
    let bytes = snapshot_to_bytes(definition)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

#[derive(Debug, Serialize)]
struct ExportNode {
    flat_id: u32,
    cluster: u64,
    local_node: u32,
}

#[derive(Debug, Serialize)]
struct ExportCluster {
    cluster: u64,
    color: String,
    level: i32,
    leaf: bool,
    node_count: usize,
    edge_count: usize,
}

#[derive(Debug, Serialize)]
struct InstanceExport {
    schema_version: SchemaVersion,
    seed: u64,
    definition_hash: String,
    instance_hash: String,
    nodes: Vec<ExportNode>,
    edges: Vec<(u32, u32)>,
    clusters: Vec<ExportCluster>,
}

/// Exports the flattened instance as JSON for presentation layers.
///
/// The export carries the dense node numbering with each node's stable
/// origin, the edge list and per-cluster display metadata.
pub fn instance_to_json(instance: &GraphInstance) -> Result<String, StrataError> {
    let export = InstanceExport {
        schema_version: SchemaVersion::default(),
        seed: instance.seed,
        definition_hash: instance.definition_hash.clone(),
        instance_hash: instance.instance_hash(),
        nodes: instance
            .flattened
            .nodes()
            .iter()
            .enumerate()
            .map(|(index, node)| ExportNode {
                flat_id: index as u32,
                cluster: node.origin.cluster.as_raw(),
                local_node: node.origin.node.as_raw(),
            })
            .collect(),
        edges: instance.flattened.edge_pairs(),
        clusters: instance
            .meta
            .iter()
            .map(|(id, meta)| ExportCluster {
                cluster: id.as_raw(),
                color: meta.color.clone(),
                level: meta.level,
                leaf: meta.leaf,
                node_count: meta.node_count,
                edge_count: meta.edge_count,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&export)
        .map_err(|err| StrataError::Serde(ErrorInfo::new("instance-serialize", err.to_string())))
}
