//! Per-fixture outcomes and the aggregated batch report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::BatchError;

/// Why a fixture was not converted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Declares pixel-matrix data Spectrum cannot address
    Matrix,
}

/// Which stage a failed fixture broke in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    List,
    Read,
    Parse,
    Write,
}

/// What happened to one input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FixtureOutcome {
    Converted {
        /// Path relative to the input root
        path: String,
        /// Where the manifest was written
        output: String,
        /// SHA256 of the written manifest
        sha256: String,
    },
    Skipped {
        path: String,
        name: String,
        reason: SkipReason,
    },
    Failed {
        path: String,
        kind: FailureKind,
        error: String,
    },
}

impl FixtureOutcome {
    pub fn path(&self) -> &str {
        match self {
            FixtureOutcome::Converted { path, .. }
            | FixtureOutcome::Skipped { path, .. }
            | FixtureOutcome::Failed { path, .. } => path,
        }
    }

    /// Record a per-file error as a failed outcome
    pub fn failed(path: impl Into<String>, error: &BatchError) -> Self {
        FixtureOutcome::Failed {
            path: path.into(),
            kind: error.failure_kind().unwrap_or(FailureKind::Read),
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.converted + self.skipped + self.failed
    }
}

/// Report for one batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub input_root: String,
    pub output_root: String,
    pub summary: BatchSummary,
    pub outcomes: Vec<FixtureOutcome>,
}

impl BatchReport {
    /// Build a report, ordering outcomes by input path
    pub fn new(input_root: &Path, output_root: &Path, mut outcomes: Vec<FixtureOutcome>) -> Self {
        outcomes.sort_by(|a, b| a.path().cmp(b.path()));

        let mut summary = BatchSummary::default();
        for outcome in &outcomes {
            match outcome {
                FixtureOutcome::Converted { .. } => summary.converted += 1,
                FixtureOutcome::Skipped { .. } => summary.skipped += 1,
                FixtureOutcome::Failed { .. } => summary.failed += 1,
            }
        }

        Self {
            generated_at: Utc::now(),
            input_root: input_root.to_string_lossy().into_owned(),
            output_root: output_root.to_string_lossy().into_owned(),
            summary,
            outcomes,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &FixtureOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FixtureOutcome::Failed { .. }))
    }

    /// Save the report as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), BatchError> {
        let content = serde_json::to_string_pretty(self)?;
        let write_error = |source| BatchError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, content).map_err(write_error)?;
        Ok(())
    }
}

/// Compute SHA256 hash of data and return as hex string
pub fn sha256_hex(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
