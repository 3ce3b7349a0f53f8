#![deny(missing_docs)]
#![doc = "Leaf graph storage, seeded random generators and canonical hashing for the Strata engine."]

mod component;
mod generate;
mod hash;
mod serialization;
mod storage;

pub use component::giant_component;
pub use generate::{
    configuration_model_graph, degree_sequence_from_series, expected_degree_graph,
    repair_odd_degree_sum,
};
pub use hash::{flat_hash, leaf_hash};
pub use serialization::{leaf_from_bytes, leaf_from_json, leaf_to_bytes, leaf_to_json};
pub use storage::{FlatEdge, FlatGraph, FlatNode, GlobalEdge, LeafGraph};
