//! Derived tree structure used during builds.

use std::collections::BTreeMap;

use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::ClusterId;

use crate::definition::GraphDefinition;

/// Tree facts derived once per build from a validated definition.
pub(crate) struct ClusterTopology {
    /// Per cluster: itself first, then parents up to a root.
    pub chains: BTreeMap<ClusterId, Vec<ClusterId>>,
    /// Display levels: leaves carry `-depth`, groups their subtree height.
    pub levels: BTreeMap<ClusterId, i32>,
    /// Leaves in depth-first order (roots in creation order, children in
    /// sibling order). Aggregation and flattening both follow this order.
    pub leaves: Vec<ClusterId>,
    /// Groups in the same depth-first order.
    pub groups: Vec<ClusterId>,
}

impl ClusterTopology {
    pub(crate) fn new(definition: &GraphDefinition) -> Result<Self, StrataError> {
        let mut chains = BTreeMap::new();
        let mut levels = BTreeMap::new();
        let mut leaves = Vec::new();
        let mut groups = Vec::new();

        let mut stack: Vec<ClusterId> = definition
            .roots()
            .map(|node| node.id)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        while let Some(id) = stack.pop() {
            let node = definition.cluster(id).ok_or_else(|| missing(id))?;
            let mut chain = vec![id];
            if let Some(parent) = node.parent {
                let parent_chain: &Vec<ClusterId> =
                    chains.get(&parent).ok_or_else(|| missing(parent))?;
                chain.extend(parent_chain.iter().copied());
            }
            chains.insert(id, chain);

            if node.is_leaf() {
                leaves.push(id);
            } else {
                groups.push(id);
            }
            for child in node.children.iter().rev() {
                stack.push(*child);
            }
        }

        for (id, chain) in &chains {
            let node = definition.cluster(*id).ok_or_else(|| missing(*id))?;
            let level = if node.is_leaf() {
                -((chain.len() - 1) as i32)
            } else {
                subtree_height(definition, *id)? as i32
            };
            levels.insert(*id, level);
        }

        Ok(Self {
            chains,
            levels,
            leaves,
            groups,
        })
    }

    /// Group ancestors of a cluster, nearest first.
    pub(crate) fn group_ancestors(&self, id: ClusterId) -> Result<&[ClusterId], StrataError> {
        let chain = self.chains.get(&id).ok_or_else(|| missing(id))?;
        Ok(&chain[1..])
    }
}

fn subtree_height(definition: &GraphDefinition, id: ClusterId) -> Result<usize, StrataError> {
    let node = definition.cluster(id).ok_or_else(|| missing(id))?;
    let mut height = 0usize;
    for child in &node.children {
        height = height.max(subtree_height(definition, *child)?);
    }
    Ok(height + usize::from(!node.is_leaf()))
}

fn missing(id: ClusterId) -> StrataError {
    StrataError::Build(
        ErrorInfo::new("missing-cluster", "cluster referenced during build is not defined")
            .with_context("cluster", id.as_raw().to_string()),
    )
}
