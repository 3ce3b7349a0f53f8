#![deny(missing_docs)]
#![doc = "Biased and assortative sampling of inter-cluster connection edges."]

mod bias;
mod report;
mod sampler;
mod spec;

pub use report::{BucketShortfall, SampleReport, SideLabel};
pub use sampler::{sample_connection, ConnectionSample};
pub use spec::{ConnectionSpec, SampleSide};
