//! Request/response contract for the external numerical measures engine.

use serde::{Deserialize, Serialize};

use strata_core::errors::StrataError;
use strata_core::Series;

/// Client-side view of the measures engine.
///
/// The engine holds one active graph at a time; `set_graph` replaces it and
/// every later request reads the active graph. The active graph must not
/// change while a request is outstanding, which the runner guarantees by
/// owning the service on a single worker thread.
pub trait MeasureService: Send {
    /// Replaces the active graph with the given edge list.
    fn set_graph(&mut self, edges: &[(u32, u32)], node_count: usize) -> Result<(), StrataError>;

    /// Computes a named per-node distribution as a histogram series.
    fn distribution(&mut self, name: &str, bins: usize) -> Result<Series, StrataError>;

    /// Computes the scalar degree assortativity of the active graph.
    fn assortativity(&mut self) -> Result<f64, StrataError>;

    /// Computes the diameter; `None` when the graph is disconnected.
    fn diameter(&mut self) -> Result<Option<f64>, StrataError>;

    /// Computes the clustering coefficient conditioned on degree.
    fn clustering_by_degree(&mut self) -> Result<Series, StrataError>;
}

/// One measure to request against the active graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MeasureRequest {
    /// Named per-node distribution with the given histogram bin count.
    Distribution {
        /// Engine-side measure name.
        name: String,
        /// Number of histogram bins.
        bins: usize,
    },
    /// Scalar degree assortativity.
    Assortativity,
    /// Graph diameter.
    Diameter,
    /// Clustering coefficient by degree.
    ClusteringByDegree,
}

impl MeasureRequest {
    /// Stable key the result is published under.
    pub fn key(&self) -> String {
        match self {
            MeasureRequest::Distribution { name, .. } => format!("distribution:{name}"),
            MeasureRequest::Assortativity => "assortativity".to_string(),
            MeasureRequest::Diameter => "diameter".to_string(),
            MeasureRequest::ClusteringByDegree => "clustering-by-degree".to_string(),
        }
    }
}

/// Result of one measure request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum MeasureValue {
    /// A series of points, for distributions and conditioned measures.
    Series(Series),
    /// A plain scalar.
    Scalar(f64),
    /// A scalar that may be undefined, such as a disconnected diameter.
    MaybeScalar(Option<f64>),
}

/// One published measure result, tagged with its originating build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureUpdate {
    /// Build the result was computed for.
    pub build_id: u64,
    /// Key from [`MeasureRequest::key`].
    pub key: String,
    /// Computed value.
    pub value: MeasureValue,
}

/// A batch of requests to evaluate against one graph.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurePlan {
    /// Build identifier stamped on every update of the plan.
    pub build_id: u64,
    /// Node count of the graph.
    pub node_count: usize,
    /// Edge list as dense flat identifier pairs.
    pub edges: Vec<(u32, u32)>,
    /// Requests evaluated in order.
    pub requests: Vec<MeasureRequest>,
}

impl MeasurePlan {
    /// The standard request set evaluated after every build.
    pub fn standard(build_id: u64, node_count: usize, edges: Vec<(u32, u32)>) -> Self {
        Self {
            build_id,
            node_count,
            edges,
            requests: vec![
                MeasureRequest::Distribution {
                    name: "degree".to_string(),
                    bins: 16,
                },
                MeasureRequest::Assortativity,
                MeasureRequest::Diameter,
                MeasureRequest::ClusteringByDegree,
            ],
        }
    }
}
