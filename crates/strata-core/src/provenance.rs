//! Schema descriptors shared across Strata artifacts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic version embedded in every persisted payload.
///
/// Payloads older than the reader deserialize through serde defaults;
/// payloads newer than the reader are rejected, so the ordering derive is
/// part of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Incremented for breaking payload changes.
    pub major: u32,
    /// Incremented for additive payload changes.
    pub minor: u32,
    /// Incremented for fixes that leave the payload shape alone.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
