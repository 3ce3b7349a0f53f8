//! Build manifests describing a completed generation run.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::SchemaVersion;

use crate::report::BuildReport;

/// Structured manifest written next to generated artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildManifest {
    /// Schema version of the manifest payload.
    pub schema_version: SchemaVersion,
    /// UTC timestamp of the build in RFC 3339 form.
    pub created_at: String,
    /// Master seed the instance was built with.
    pub seed: u64,
    /// Canonical hash of the definition that was built.
    pub definition_hash: String,
    /// Canonical hash of the flattened instance.
    pub instance_hash: String,
    /// Build report for the run.
    pub report: BuildReport,
    /// Artifact files written by the run, relative to the manifest.
    pub artifacts: Vec<PathBuf>,
}

impl BuildManifest {
    /// Creates a manifest for a completed build, stamped with the current time.
    pub fn new(seed: u64, report: BuildReport, artifacts: Vec<PathBuf>) -> Self {
        Self {
            schema_version: SchemaVersion::default(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            seed,
            definition_hash: report.definition_hash.clone(),
            instance_hash: report.instance_hash.clone(),
            report,
            artifacts,
        }
    }

    /// Writes the manifest to a JSON file, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<(), StrataError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                StrataError::Serde(
                    ErrorInfo::new("manifest-mkdir", err.to_string())
                        .with_context("path", parent.display().to_string()),
                )
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            StrataError::Serde(
                ErrorInfo::new("manifest-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(path, json).map_err(|err| {
            StrataError::Serde(
                ErrorInfo::new("manifest-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, StrataError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            StrataError::Serde(
                ErrorInfo::new("manifest-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            StrataError::Serde(
                ErrorInfo::new("manifest-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}
