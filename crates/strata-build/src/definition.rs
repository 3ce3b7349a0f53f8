//! Hierarchy definitions: the persisted, user-edited description of a graph.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::{ClusterId, SchemaVersion, Series};

/// Master seed used when a definition does not specify one.
pub const DEFAULT_SEED: u64 = 0x05EE_D5EE_DD15_5EED;

/// Colors cycled through when clusters are created.
pub const CLUSTER_PALETTE: [&str; 10] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

/// Parameters shared by the leaf graph generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafParams {
    /// Number of nodes to generate before any giant-component filtering.
    pub node_count: usize,
    /// Degree distribution the generated sequence is drawn from.
    pub degree_distribution: Series,
    /// Keep only the largest connected component of the generated graph.
    #[serde(default)]
    pub giant_component_only: bool,
    /// Keep self loops; only the configuration model can realize them.
    #[serde(default)]
    pub self_loops: bool,
}

/// Generator attached to a cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GeneratorKind {
    /// Expected-degree random graph over a drawn weight sequence.
    ChungLu(LeafParams),
    /// Stub-matching realization of a drawn degree sequence.
    ConfigurationModel(LeafParams),
    /// Grouping node that owns children and generates nothing itself.
    MetaGroup,
}

impl GeneratorKind {
    /// Returns the leaf parameters when the generator produces a graph.
    pub fn params(&self) -> Option<&LeafParams> {
        match self {
            GeneratorKind::ChungLu(params) | GeneratorKind::ConfigurationModel(params) => {
                Some(params)
            }
            GeneratorKind::MetaGroup => None,
        }
    }

    /// Returns true for grouping nodes.
    pub fn is_group(&self) -> bool {
        matches!(self, GeneratorKind::MetaGroup)
    }

    /// Stable label used in hashes and reports.
    pub fn label(&self) -> &'static str {
        match self {
            GeneratorKind::ChungLu(_) => "chung-lu",
            GeneratorKind::ConfigurationModel(_) => "configuration-model",
            GeneratorKind::MetaGroup => "meta-group",
        }
    }
}

/// One cluster of the hierarchy tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterNode {
    /// Identifier, unique within the definition and never reused.
    pub id: ClusterId,
    /// Owning group, or `None` for root clusters.
    pub parent: Option<ClusterId>,
    /// Children in sibling order; non-empty only for groups.
    #[serde(default)]
    pub children: Vec<ClusterId>,
    /// Generator driving this cluster.
    pub generator: GeneratorKind,
    /// Display color assigned from the palette, user overridable.
    pub color: String,
}

impl ClusterNode {
    /// Returns true when the cluster generates its own graph.
    pub fn is_leaf(&self) -> bool {
        !self.generator.is_group()
    }

    /// Computes the change token covering every generation-relevant field.
    ///
    /// Tokens are computed on demand and never stored in the definition;
    /// two clusters agree on their token exactly when regeneration would
    /// reproduce the same graph under the same master seed. Display fields
    /// such as the color and the position in the tree do not participate.
    pub fn change_token(&self, seed: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(seed.to_le_bytes());
        hasher.update(self.generator.label().as_bytes());
        if let Some(params) = self.generator.params() {
            hasher.update((params.node_count as u64).to_le_bytes());
            let points = params.degree_distribution.points();
            hasher.update((points.len() as u64).to_le_bytes());
            for point in points {
                hasher.update(point.x.to_bits().to_le_bytes());
                hasher.update(point.y.to_bits().to_le_bytes());
            }
            hasher.update([u8::from(params.giant_component_only)]);
            hasher.update([u8::from(params.self_loops)]);
        }
        format!("{:x}", hasher.finalize())
    }
}

/// One inter-cluster connection definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConnection {
    /// Cluster edges are drawn from.
    pub source: ClusterId,
    /// Cluster edges are drawn to.
    pub target: ClusterId,
    /// Number of edges to draw.
    pub edge_count: usize,
    /// Fraction of source-side nodes participating, in `[0, 1]`.
    pub fraction_source: f64,
    /// Fraction of target-side nodes participating, in `[0, 1]`.
    pub fraction_target: f64,
    /// Optional degree bias curve for the source side.
    #[serde(default)]
    pub bias_source: Option<Series>,
    /// Optional degree bias curve for the target side.
    #[serde(default)]
    pub bias_target: Option<Series>,
    /// Degree assortativity in `[-1, 1]`.
    #[serde(default)]
    pub assortativity: f64,
}

impl ClusterConnection {
    fn validate(&self, definition: &GraphDefinition) -> Result<(), StrataError> {
        for endpoint in [self.source, self.target] {
            if definition.cluster(endpoint).is_none() {
                return Err(StrataError::Build(
                    ErrorInfo::new("missing-cluster", "connection references unknown cluster")
                        .with_context("cluster", endpoint.as_raw().to_string()),
                ));
            }
        }
        if self.source == self.target {
            return Err(StrataError::Build(
                ErrorInfo::new("self-connection", "connection endpoints must differ")
                    .with_context("cluster", self.source.as_raw().to_string()),
            ));
        }
        for (label, fraction) in [
            ("fraction-source", self.fraction_source),
            ("fraction-target", self.fraction_target),
        ] {
            if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
                return Err(StrataError::Build(
                    ErrorInfo::new("invalid-fraction", "node fraction outside the unit interval")
                        .with_context("which", label)
                        .with_context("value", fraction.to_string()),
                ));
            }
        }
        if !self.assortativity.is_finite() || self.assortativity.abs() > 1.0 {
            return Err(StrataError::Build(
                ErrorInfo::new("invalid-assortativity", "assortativity outside [-1, 1]")
                    .with_context("value", self.assortativity.to_string()),
            ));
        }
        Ok(())
    }
}

/// Complete user-edited description of a hierarchical graph.
///
/// The definition is the single serialized artifact: instances are always
/// derivable from it and are never persisted. Cluster identifiers come from
/// a monotonic counter and are never reused after removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDefinition {
    /// Schema version of the serialized payload.
    pub schema_version: SchemaVersion,
    /// Master seed all random substreams derive from.
    pub seed: u64,
    next_id: u64,
    clusters: Vec<ClusterNode>,
    connections: Vec<ClusterConnection>,
}

impl GraphDefinition {
    /// Creates an empty definition with the given master seed.
    pub fn new(seed: u64) -> Self {
        Self {
            schema_version: SchemaVersion::default(),
            seed,
            next_id: 0,
            clusters: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Returns the cluster with the given id, if present.
    pub fn cluster(&self, id: ClusterId) -> Option<&ClusterNode> {
        self.clusters.iter().find(|node| node.id == id)
    }

    fn cluster_mut(&mut self, id: ClusterId) -> Option<&mut ClusterNode> {
        self.clusters.iter_mut().find(|node| node.id == id)
    }

    fn require(&self, id: ClusterId) -> Result<&ClusterNode, StrataError> {
        self.cluster(id).ok_or_else(|| {
            StrataError::Build(
                ErrorInfo::new("missing-cluster", "no cluster with this id")
                    .with_context("cluster", id.as_raw().to_string()),
            )
        })
    }

    /// Returns all clusters in creation order.
    pub fn clusters(&self) -> &[ClusterNode] {
        &self.clusters
    }

    /// Returns root clusters in creation order.
    pub fn roots(&self) -> impl Iterator<Item = &ClusterNode> {
        self.clusters.iter().filter(|node| node.parent.is_none())
    }

    /// Returns all connections in creation order.
    pub fn connections(&self) -> &[ClusterConnection] {
        &self.connections
    }

    /// Adds a cluster under `parent` (or as a root) and returns its id.
    pub fn add_cluster(
        &mut self,
        parent: Option<ClusterId>,
        generator: GeneratorKind,
    ) -> Result<ClusterId, StrataError> {
        if let Some(parent_id) = parent {
            let parent_node = self.require(parent_id)?;
            if !parent_node.generator.is_group() {
                return Err(StrataError::Build(
                    ErrorInfo::new("parent-not-group", "only groups can own children")
                        .with_context("parent", parent_id.as_raw().to_string())
                        .with_hint("switch the parent generator to a meta group first"),
                ));
            }
        }
        let id = ClusterId::from_raw(self.next_id);
        let color = CLUSTER_PALETTE[(self.next_id as usize) % CLUSTER_PALETTE.len()].to_string();
        self.next_id += 1;
        self.clusters.push(ClusterNode {
            id,
            parent,
            children: Vec::new(),
            generator,
            color,
        });
        if let Some(parent_id) = parent {
            if let Some(parent_node) = self.cluster_mut(parent_id) {
                parent_node.children.push(id);
            }
        }
        Ok(id)
    }

    /// Removes a cluster with its whole subtree and any touching connections.
    pub fn remove_cluster(&mut self, id: ClusterId) -> Result<(), StrataError> {
        self.require(id)?;
        let mut doomed = vec![id];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let current = doomed[cursor];
            cursor += 1;
            if let Some(node) = self.cluster(current) {
                doomed.extend(node.children.iter().copied());
            }
        }
        if let Some(parent_id) = self.require(id)?.parent {
            if let Some(parent_node) = self.cluster_mut(parent_id) {
                parent_node.children.retain(|child| *child != id);
            }
        }
        self.clusters.retain(|node| !doomed.contains(&node.id));
        self.connections
            .retain(|conn| !doomed.contains(&conn.source) && !doomed.contains(&conn.target));
        Ok(())
    }

    /// Replaces the generator of a cluster.
    ///
    /// A group with children cannot become a leaf; remove or re-home the
    /// children first.
    pub fn set_generator(
        &mut self,
        id: ClusterId,
        generator: GeneratorKind,
    ) -> Result<(), StrataError> {
        let node = self.require(id)?;
        if !node.children.is_empty() && !generator.is_group() {
            return Err(StrataError::Build(
                ErrorInfo::new("group-has-children", "cannot turn a populated group into a leaf")
                    .with_context("cluster", id.as_raw().to_string())
                    .with_context("children", node.children.len().to_string()),
            ));
        }
        if let Some(node) = self.cluster_mut(id) {
            node.generator = generator;
        }
        Ok(())
    }

    /// Overrides the display color of a cluster.
    pub fn set_color(&mut self, id: ClusterId, color: impl Into<String>) -> Result<(), StrataError> {
        self.require(id)?;
        if let Some(node) = self.cluster_mut(id) {
            node.color = color.into();
        }
        Ok(())
    }

    /// Replaces the master seed.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    /// Adds an inter-cluster connection.
    pub fn connect(&mut self, connection: ClusterConnection) -> Result<(), StrataError> {
        connection.validate(self)?;
        self.connections.push(connection);
        Ok(())
    }

    /// Removes every connection between the two clusters.
    pub fn disconnect(&mut self, source: ClusterId, target: ClusterId) {
        self.connections
            .retain(|conn| !(conn.source == source && conn.target == target));
    }

    /// Computes change tokens for every leaf cluster.
    pub fn tokens(&self) -> BTreeMap<ClusterId, String> {
        self.clusters
            .iter()
            .filter(|node| node.is_leaf())
            .map(|node| (node.id, node.change_token(self.seed)))
            .collect()
    }

    /// Checks the structural invariants of the definition.
    ///
    /// Validation failures are recoverable: the caller keeps the previous
    /// instance and surfaces the error. Lookup failures during a build, by
    /// contrast, mean the builder itself broke an invariant.
    pub fn validate(&self) -> Result<(), StrataError> {
        let mut ids = BTreeMap::new();
        for node in &self.clusters {
            if ids.insert(node.id, ()).is_some() {
                return Err(StrataError::Build(
                    ErrorInfo::new("duplicate-cluster-id", "cluster id appears twice")
                        .with_context("cluster", node.id.as_raw().to_string()),
                ));
            }
        }

        for node in &self.clusters {
            if node.is_leaf() && !node.children.is_empty() {
                return Err(StrataError::Build(
                    ErrorInfo::new("leaf-with-children", "only groups can own children")
                        .with_context("cluster", node.id.as_raw().to_string()),
                ));
            }
            for child_id in &node.children {
                let child = self.require(*child_id).map_err(|_| {
                    StrataError::Build(
                        ErrorInfo::new("missing-cluster", "child listed but not defined")
                            .with_context("parent", node.id.as_raw().to_string())
                            .with_context("child", child_id.as_raw().to_string()),
                    )
                })?;
                if child.parent != Some(node.id) {
                    return Err(StrataError::Build(
                        ErrorInfo::new("parent-child-mismatch", "child does not point back at parent")
                            .with_context("parent", node.id.as_raw().to_string())
                            .with_context("child", child_id.as_raw().to_string()),
                    ));
                }
            }
            if let Some(parent_id) = node.parent {
                let parent = self.require(parent_id).map_err(|_| {
                    StrataError::Build(
                        ErrorInfo::new("missing-cluster", "parent not defined")
                            .with_context("cluster", node.id.as_raw().to_string())
                            .with_context("parent", parent_id.as_raw().to_string()),
                    )
                })?;
                if !parent.children.contains(&node.id) {
                    return Err(StrataError::Build(
                        ErrorInfo::new("parent-child-mismatch", "parent does not list this child")
                            .with_context("cluster", node.id.as_raw().to_string())
                            .with_context("parent", parent_id.as_raw().to_string()),
                    ));
                }
            }
        }

        // Walking up must terminate well inside the cluster count.
        for node in &self.clusters {
            let mut steps = 0usize;
            let mut cursor = node.parent;
            while let Some(parent_id) = cursor {
                steps += 1;
                if steps > self.clusters.len() {
                    return Err(StrataError::Build(
                        ErrorInfo::new("cluster-cycle", "parent links form a cycle")
                            .with_context("cluster", node.id.as_raw().to_string()),
                    ));
                }
                cursor = self.cluster(parent_id).and_then(|parent| parent.parent);
            }
        }

        for connection in &self.connections {
            connection.validate(self)?;
        }
        Ok(())
    }
}

impl Default for GraphDefinition {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}
