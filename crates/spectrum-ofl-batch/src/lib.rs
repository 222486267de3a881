//! Spectrum OFL Batch - converts a whole OFL fixture tree
//!
//! This crate provides:
//! - Discovery of `manufacturer/fixture` files under an input root
//! - A per-file read, detect, convert, write pipeline with bounded fan-out
//! - A per-file outcome report with converted/skipped/failed totals

pub mod driver;
pub mod report;
pub mod walk;

#[cfg(test)]
mod testing;

pub use driver::{process_fixture, BatchConfig, BatchDriver};
pub use report::{BatchReport, BatchSummary, FailureKind, FixtureOutcome, SkipReason};
pub use walk::{discover_fixtures, FixtureFile, FixtureTree};

use spectrum_ofl_core::FixtureError;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Input directory not found: {0}")]
    InputNotFound(PathBuf),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Failed to list {path}: {source}")]
    List {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: FixtureError },
    #[error("Failed to encode {path}: {source}")]
    Encode { path: PathBuf, source: FixtureError },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
    #[error("Fixture task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl BatchError {
    /// Stage a per-file error belongs to; `None` for batch-level errors
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            BatchError::List { .. } => Some(FailureKind::List),
            BatchError::Read { .. } => Some(FailureKind::Read),
            BatchError::Parse { .. } => Some(FailureKind::Parse),
            BatchError::Encode { .. } | BatchError::Write { .. } => Some(FailureKind::Write),
            _ => None,
        }
    }

    /// Filesystem path the error refers to, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            BatchError::InputNotFound(path) | BatchError::NotADirectory(path) => Some(path.as_path()),
            BatchError::List { path, .. }
            | BatchError::Read { path, .. }
            | BatchError::Parse { path, .. }
            | BatchError::Encode { path, .. }
            | BatchError::Write { path, .. } => Some(path.as_path()),
            BatchError::Report(_) | BatchError::Task(_) => None,
        }
    }
}
