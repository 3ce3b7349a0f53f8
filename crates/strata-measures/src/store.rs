//! Published measure values for the current build.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::protocol::{MeasureUpdate, MeasureValue};

/// Measure values published for one build.
///
/// The store only accepts updates carrying its own build identifier, so
/// results from a superseded build can never overwrite newer state even if
/// their worker raced past its cancellation checks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeasureStore {
    /// Build the stored values belong to.
    pub build_id: u64,
    values: BTreeMap<String, MeasureValue>,
}

impl MeasureStore {
    /// Creates an empty store for the given build.
    pub fn for_build(build_id: u64) -> Self {
        Self {
            build_id,
            values: BTreeMap::new(),
        }
    }

    /// Applies an update; returns false when it belongs to another build.
    pub fn apply(&mut self, update: MeasureUpdate) -> bool {
        if update.build_id != self.build_id {
            return false;
        }
        self.values.insert(update.key, update.value);
        true
    }

    /// Looks up a published value by key.
    pub fn get(&self, key: &str) -> Option<&MeasureValue> {
        self.values.get(key)
    }

    /// Returns all published values in key order.
    pub fn values(&self) -> &BTreeMap<String, MeasureValue> {
        &self.values
    }

    /// Number of published values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when nothing has been published yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
