//! Batch conversion driver
//!
//! Every fixture file is an independent read, detect, convert, write unit.
//! Files fan out over a `JoinSet` bounded by a semaphore and their outcomes
//! are collected into a [`BatchReport`].

use serde::{Deserialize, Serialize};
use spectrum_ofl_core::{convert_fixture, has_matrix, ConvertOptions, SourceFixture};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::report::{sha256_hex, BatchReport, FixtureOutcome, SkipReason};
use crate::walk::{check_output_root, discover_fixtures, FixtureFile, FixtureTree};
use crate::BatchError;

/// Batch driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of fixtures processed at once
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Abort the whole batch on the first per-file error
    #[serde(default)]
    pub fail_fast: bool,
    #[serde(default)]
    pub convert: ConvertOptions,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            fail_fast: false,
            convert: ConvertOptions::default(),
        }
    }
}

pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Converts an OFL `manufacturer/fixture` tree into a mirrored Spectrum tree
#[derive(Debug, Clone)]
pub struct BatchDriver {
    input_root: PathBuf,
    output_root: PathBuf,
    config: BatchConfig,
}

impl BatchDriver {
    pub fn new(
        input_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        config: BatchConfig,
    ) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            config,
        }
    }

    /// Run the batch
    ///
    /// Root directory problems are always returned as errors. Per-file errors
    /// end up as failed outcomes in the report, unless `fail_fast` is set, in
    /// which case the first one is returned and outstanding work is aborted.
    pub async fn run(&self) -> Result<BatchReport, BatchError> {
        check_output_root(&self.output_root).await?;
        let tree = discover_fixtures(&self.input_root).await?;
        self.convert_tree(tree).await
    }

    async fn convert_tree(&self, tree: FixtureTree) -> Result<BatchReport, BatchError> {
        info!(
            input = %self.input_root.display(),
            output = %self.output_root.display(),
            fixtures = tree.files.len(),
            jobs = self.config.jobs,
            "Starting batch conversion"
        );

        let mut outcomes = Vec::with_capacity(tree.files.len() + tree.unreadable.len());
        for error in tree.unreadable {
            if self.config.fail_fast {
                return Err(error);
            }
            warn!(error = %error, "Skipping unreadable manufacturer directory");
            let path = error
                .path()
                .map(|path| relative_display(&self.input_root, path))
                .unwrap_or_default();
            outcomes.push(FixtureOutcome::failed(path, &error));
        }

        if self.config.jobs <= 1 {
            for file in &tree.files {
                let result = process_fixture(file, &self.output_root, &self.config.convert).await;
                outcomes.push(self.settle(file, result)?);
            }
        } else {
            outcomes.extend(self.run_parallel(tree.files).await?);
        }

        let report = BatchReport::new(&self.input_root, &self.output_root, outcomes);
        info!(
            converted = report.summary.converted,
            skipped = report.summary.skipped,
            failed = report.summary.failed,
            "Batch conversion finished"
        );
        Ok(report)
    }

    async fn run_parallel(&self, files: Vec<FixtureFile>) -> Result<Vec<FixtureOutcome>, BatchError> {
        let limit = self
            .config
            .jobs
            .min(files.len())
            .clamp(1, Semaphore::MAX_PERMITS);
        let permits = Arc::new(Semaphore::new(limit));
        let mut tasks = JoinSet::new();

        for file in files {
            let permits = Arc::clone(&permits);
            let output_root = self.output_root.clone();
            let options = self.config.convert;
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                let result = process_fixture(&file, &output_root, &options).await;
                (file, result)
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (file, result) = joined?;
            match self.settle(&file, result) {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }

        Ok(outcomes)
    }

    // Apply the failure policy to one file's result
    fn settle(
        &self,
        file: &FixtureFile,
        result: Result<FixtureOutcome, BatchError>,
    ) -> Result<FixtureOutcome, BatchError> {
        match result {
            Ok(outcome) => Ok(outcome),
            Err(e) if self.config.fail_fast => Err(e),
            Err(e) => {
                warn!(path = %file.display_path(), error = %e, "Fixture conversion failed");
                Ok(FixtureOutcome::failed(file.display_path(), &e))
            }
        }
    }
}

/// Read, check, convert, and write a single fixture file
pub async fn process_fixture(
    file: &FixtureFile,
    output_root: &Path,
    options: &ConvertOptions,
) -> Result<FixtureOutcome, BatchError> {
    let content = tokio::fs::read(&file.source)
        .await
        .map_err(|source| BatchError::Read {
            path: file.source.clone(),
            source,
        })?;

    let fixture = SourceFixture::from_slice(&content).map_err(|source| BatchError::Parse {
        path: file.source.clone(),
        source,
    })?;

    if has_matrix(&fixture) {
        info!("Skipping fixture '{}' as it uses matrices.", fixture.name);
        return Ok(FixtureOutcome::Skipped {
            path: file.display_path(),
            name: fixture.name,
            reason: SkipReason::Matrix,
        });
    }

    let converted = convert_fixture(&fixture, options);
    let output_path = file.output_path(output_root);
    let json = converted.to_json_pretty().map_err(|source| BatchError::Encode {
        path: output_path.clone(),
        source,
    })?;

    write_manifest(&output_path, json.as_bytes()).await?;
    info!(path = %output_path.display(), name = %converted.info.name, "Wrote fixture");

    Ok(FixtureOutcome::Converted {
        path: file.display_path(),
        output: output_path.to_string_lossy().into_owned(),
        sha256: sha256_hex(json.as_bytes()),
    })
}

/// Write a manifest through a sibling temp file renamed over `path`
///
/// The target either keeps its previous content or holds the complete new
/// manifest. The temp file is removed when any step fails.
async fn write_manifest(path: &Path, content: &[u8]) -> Result<(), BatchError> {
    let write_error = |source| BatchError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    tokio::fs::create_dir_all(&parent).await.map_err(write_error)?;

    let target = path.to_path_buf();
    let content = content.to_vec();
    let bytes = content.len();
    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let mut staged = NamedTempFile::new_in(&parent)?;
        staged.write_all(&content)?;
        staged.as_file().sync_all()?;
        staged.persist(&target).map_err(|e| e.error)?;
        Ok(())
    })
    .await?
    .map_err(write_error)?;

    debug!(path = %path.display(), bytes, "Manifest written");
    Ok(())
}

fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
