#![deny(missing_docs)]
#![doc = "Protocol and cancellation-aware runner for the external measures engine."]

mod protocol;
mod runner;
mod store;

pub use protocol::{MeasurePlan, MeasureRequest, MeasureService, MeasureUpdate, MeasureValue};
pub use runner::MeasureRunner;
pub use store::MeasureStore;
