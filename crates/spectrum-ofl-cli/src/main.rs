//! ofl2spectrum - Convert an OFL fixture tree into Spectrum fixture manifests
//!
//! Walks `INPUT/<manufacturer>/<fixture>.json`, skips matrix fixtures, and
//! writes converted manifests to the same relative paths under `OUTPUT`.

mod config;

use anyhow::{anyhow, Result};
use clap::Parser;
use spectrum_ofl_batch::{BatchDriver, BatchError, BatchReport};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::ConfigError;

#[derive(Parser, Debug)]
#[command(name = "ofl2spectrum")]
#[command(about = "Convert Open Fixture Library fixtures into Spectrum fixture manifests")]
#[command(version)]
struct Args {
    /// OFL fixtures directory (one sub-directory per manufacturer)
    input: PathBuf,

    /// Output directory; mirrors the input layout
    output: PathBuf,

    /// Path to an option file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of fixtures converted concurrently
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Abort the whole batch on the first fixture error
    #[arg(long)]
    fail_fast: bool,

    /// Flatten channel capabilities into a list of objects
    #[arg(long)]
    normalize_capabilities: bool,

    /// Write a JSON report of every fixture outcome
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(&args.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(1);
    }

    match run(args).await {
        Ok(report) => {
            for failure in report.failures() {
                warn!(path = failure.path(), "Not converted");
            }
            ExitCode::from(report_exit_code(&report))
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn run(args: Args) -> Result<BatchReport> {
    info!("ofl2spectrum v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config(args.config.as_deref())?;

    let mut batch = config.to_batch_config();
    if let Some(jobs) = args.jobs {
        batch.jobs = jobs.max(1);
    }
    batch.fail_fast |= args.fail_fast;
    batch.convert.normalize_capabilities |= args.normalize_capabilities;

    let driver = BatchDriver::new(&args.input, &args.output, batch);
    let report = driver.run().await?;

    println!(
        "Processed {} fixtures: converted {}, skipped {}, failed {}",
        report.summary.total(),
        report.summary.converted,
        report.summary.skipped,
        report.summary.failed
    );

    if let Some(path) = args.report.or(config.report.path) {
        report
            .save(&path)
            .map_err(|e| anyhow!("Failed to write report {}: {}", path.display(), e))?;
        info!(path = %path.display(), "Report written");
    }

    Ok(report)
}

/// Exit code for a batch that ran to completion
fn report_exit_code(report: &BatchReport) -> u8 {
    if report.has_failures() {
        7
    } else {
        0
    }
}

/// Map an error to the process exit code
fn exit_code(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<ConfigError>().is_some() {
        return 2;
    }
    match err.downcast_ref::<BatchError>() {
        Some(BatchError::InputNotFound(_)) => 3,
        Some(BatchError::NotADirectory(_)) => 4,
        Some(BatchError::Parse { .. }) => 5,
        Some(
            BatchError::List { .. }
            | BatchError::Read { .. }
            | BatchError::Encode { .. }
            | BatchError::Write { .. },
        ) => 6,
        Some(BatchError::Report(_) | BatchError::Task(_)) | None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectrum_ofl_batch::{FailureKind, FixtureOutcome, SkipReason};
    use std::path::Path;

    #[test]
    fn test_paths_are_required() {
        assert!(Args::try_parse_from(["ofl2spectrum"]).is_err());
        assert!(Args::try_parse_from(["ofl2spectrum", "fixtures"]).is_err());
    }

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "ofl2spectrum",
            "fixtures",
            "out",
            "--jobs",
            "2",
            "--fail-fast",
            "--normalize-capabilities",
            "--report",
            "report.json",
        ])
        .unwrap();
        assert_eq!(args.input, Path::new("fixtures"));
        assert_eq!(args.output, Path::new("out"));
        assert_eq!(args.jobs, Some(2));
        assert!(args.fail_fast);
        assert!(args.normalize_capabilities);
        assert_eq!(args.report, Some(PathBuf::from("report.json")));
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_log_level_is_validated() {
        let args = Args::try_parse_from(["ofl2spectrum", "in", "out", "-l", "debug"]).unwrap();
        assert_eq!(args.log_level, "debug");
        assert!(Args::try_parse_from(["ofl2spectrum", "in", "out", "-l", "verbose"]).is_err());
    }

    #[test]
    fn test_report_exit_codes() {
        let root = Path::new("fixtures");
        let skipped = FixtureOutcome::Skipped {
            path: "cameo/pixel-strip.json".to_string(),
            name: "Pixel Strip".to_string(),
            reason: SkipReason::Matrix,
        };
        let clean = BatchReport::new(root, root, vec![skipped.clone()]);
        assert_eq!(report_exit_code(&clean), 0);

        let failed = FixtureOutcome::Failed {
            path: "cameo/broken.json".to_string(),
            kind: FailureKind::Parse,
            error: "expected value".to_string(),
        };
        let hardened = BatchReport::new(root, root, vec![skipped, failed]);
        assert_eq!(report_exit_code(&hardened), 7);
    }

    #[tokio::test]
    async fn test_run_reports_failures() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let input = temp_dir.path().join("fixtures");
        std::fs::create_dir_all(input.join("cameo")).unwrap();
        std::fs::write(input.join("cameo/broken.json"), "{ not json").unwrap();

        let args = Args::try_parse_from([
            PathBuf::from("ofl2spectrum"),
            input,
            temp_dir.path().join("out"),
            PathBuf::from("--jobs"),
            PathBuf::from("1"),
        ])
        .unwrap();
        let report = run(args).await.unwrap();
        assert_eq!(report.summary.total(), 1);
        assert_eq!(report_exit_code(&report), 7);
    }

    #[test]
    fn test_exit_codes() {
        let io = || std::io::Error::new(std::io::ErrorKind::Other, "boom");

        let err = anyhow::Error::new(BatchError::InputNotFound(PathBuf::from("in")));
        assert_eq!(exit_code(&err), 3);

        let err = anyhow::Error::new(BatchError::NotADirectory(PathBuf::from("in")));
        assert_eq!(exit_code(&err), 4);

        let err = anyhow::Error::new(BatchError::Write {
            path: PathBuf::from("out/a.json"),
            source: io(),
        });
        assert_eq!(exit_code(&err), 6);

        let err = anyhow::Error::new(ConfigError::IoError {
            path: PathBuf::from("missing.toml"),
            source: io(),
        });
        assert_eq!(exit_code(&err), 2);

        assert_eq!(exit_code(&anyhow!("something else")), 1);
    }

    #[tokio::test]
    async fn test_run_with_missing_input() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let args = Args::try_parse_from([
            PathBuf::from("ofl2spectrum"),
            temp_dir.path().join("missing"),
            temp_dir.path().join("out"),
        ])
        .unwrap();
        let err = run(args).await.unwrap_err();
        assert_eq!(exit_code(&err), 3);
    }
}
