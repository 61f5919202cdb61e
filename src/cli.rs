//! # ssm-seed CLI
//!
//! Command-line surface for seeding AWS Systems Manager Parameter Store from
//! the environment declared in a deployment manifest.
//!
//! ## Usage
//!
//! ```bash
//! # Seed /<stage>/<KEY> for every ${ssm:...} reference in serverless.yml
//! ssm-seed deploy --stage dev
//!
//! # Use one value for every key that needs seeding
//! ssm-seed deploy --stage dev --ssm-default 'My Default'
//!
//! # See what would be written without calling AWS
//! ssm-seed deploy --stage prod --dry-run --output json
//! ```

use crate::config::{load_manifest, Manifest};
use crate::constants::{
    DEFAULT_CONCURRENCY, DEFAULT_MANIFEST_FILE, DEFAULT_REFERENCE_PREFIX, DEFAULT_STAGE,
};
use crate::observability::metrics;
use crate::policy::{ResolutionContext, SyncPolicy};
use crate::provider::{AwsParameterStore, InMemoryParameterStore, ParameterStore};
use crate::reconciler::{Outcome, Reconciler, RunReport};
use crate::reference::ReferencePattern;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Seed AWS SSM Parameter Store from a deployment manifest
#[derive(Parser, Debug)]
#[command(name = "ssm-seed", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (ignored when RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync SSM environment variables on deploy
    Deploy(DeployArgs),
}

/// Options for `ssm-seed deploy`
#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    /// Deployment manifest to read
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_MANIFEST_FILE)]
    pub config: PathBuf,

    /// Stage to seed (defaults to provider.stage, then "dev")
    #[arg(short, long, env = "SSM_SEED_STAGE")]
    pub stage: Option<String>,

    /// AWS region (defaults to provider.region, then the SDK chain)
    #[arg(short, long)]
    pub region: Option<String>,

    /// Value used for every key instead of the process environment
    #[arg(
        long = "ssm-default",
        visible_alias = "sd",
        value_name = "VALUE",
        env = "SSM_SEED_DEFAULT"
    )]
    pub ssm_default: Option<String>,

    /// Dotenv file loaded into the process environment before resolving values
    #[arg(long, value_name = "PATH", default_value = ".env")]
    pub env_file: PathBuf,

    /// Do not load a dotenv file
    #[arg(long)]
    pub no_dotenv: bool,

    /// Prefix marking a declared value as a parameter store reference
    #[arg(long, value_name = "PREFIX", default_value = DEFAULT_REFERENCE_PREFIX)]
    pub reference_prefix: String,

    /// Maximum parameter writes in flight
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Write to an in-memory store instead of AWS
    #[arg(long)]
    pub dry_run: bool,

    /// Report format written to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Exit non-zero when any parameter write fails
    #[arg(long)]
    pub fail_on_error: bool,

    /// With --fail-on-error, do not count "already exists" as a failure
    #[arg(long)]
    pub allow_existing: bool,

    /// Print Prometheus metrics to stderr after the run
    #[arg(long)]
    pub print_metrics: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Stage from the CLI, then the manifest, then the default
#[must_use]
pub fn resolve_stage(cli_stage: Option<&str>, manifest: &Manifest) -> String {
    cli_stage
        .filter(|s| !s.is_empty())
        .or_else(|| manifest.provider.stage.as_deref().filter(|s| !s.is_empty()))
        .unwrap_or(DEFAULT_STAGE)
        .to_string()
}

/// Region from the CLI, then the manifest; `None` leaves it to the SDK
#[must_use]
pub fn resolve_region(cli_region: Option<&str>, manifest: &Manifest) -> Option<String> {
    cli_region
        .or(manifest.provider.region.as_deref())
        .filter(|r| !r.is_empty())
        .map(ToString::to_string)
}

/// Whether a finished run should exit non-zero
#[must_use]
pub fn should_fail(report: &RunReport, args: &DeployArgs) -> bool {
    let failed = if args.allow_existing {
        report.has_unexpected_failures()
    } else {
        report.has_failures()
    };
    args.fail_on_error && failed
}

/// Human-readable report
#[must_use]
pub fn render_text(report: &RunReport) -> String {
    let mut out = String::new();
    for outcome in &report.sorted().outcomes {
        let line = match outcome {
            Outcome::StageSkipped(skipped) => format!(
                "Stage '{}' is not enabled for ssm-seed. Allowed stages: {}.",
                skipped.stage,
                skipped.allowed_stages.join(",")
            ),
            Outcome::Upserted {
                key,
                path,
                classification,
            } => format!("  set      {key} -> {path} ({classification})"),
            Outcome::Skipped { key, reason } => format!("  skipped  {key} ({})", reason.as_str()),
            Outcome::Failed { key, message, .. } => format!("  failed   {key}: {message}"),
        };
        out.push_str(&line);
        out.push('\n');
    }
    if !report.is_stage_skipped() {
        let summary = report.summary();
        out.push_str(&format!(
            "stage '{}': {} set, {} skipped, {} failed\n",
            report.stage, summary.upserted, summary.skipped, summary.failed
        ));
    }
    out
}

/// Exit code for a finished run
#[must_use]
pub fn exit_code(report: &RunReport, args: &DeployArgs) -> ExitCode {
    if should_fail(report, args) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn load_dotenv(path: &Path) {
    match dotenvy::from_path(path) {
        Ok(()) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No dotenv file at {}", path.display()),
        Err(e) => warn!("Failed to load dotenv file {}: {}", path.display(), e),
    }
}

/// Load the dotenv file (unless disabled) and the manifest
///
/// Runs before anything reads the process environment.
pub fn prepare(args: &DeployArgs) -> Manifest {
    if !args.no_dotenv {
        load_dotenv(&args.env_file);
    }
    load_manifest(&args.config).manifest
}

/// Store selected by the arguments: in-memory for `--dry-run`, AWS otherwise
pub async fn store_for(args: &DeployArgs, manifest: &Manifest) -> Arc<dyn ParameterStore> {
    if args.dry_run {
        info!("Dry run: parameters are written to an in-memory store");
        Arc::new(InMemoryParameterStore::new())
    } else {
        let region = resolve_region(args.region.as_deref(), manifest);
        Arc::new(AwsParameterStore::new(region.as_deref()).await)
    }
}

/// Seed `store` from `manifest` and the current process environment
///
/// # Errors
///
/// Returns an error if the resolved stage is empty.
pub async fn seed(
    args: &DeployArgs,
    manifest: &Manifest,
    store: Arc<dyn ParameterStore>,
) -> Result<RunReport> {
    let stage = resolve_stage(args.stage.as_deref(), manifest);
    let policy = SyncPolicy::from_manifest(manifest, args.ssm_default.clone());
    let ctx = ResolutionContext::from_process(stage).context("Invalid stage")?;

    let reconciler = Reconciler::new(store)
        .with_reference_pattern(ReferencePattern::new(args.reference_prefix.clone()))
        .with_concurrency(args.concurrency);
    Ok(reconciler
        .reconcile(&manifest.declared_environment(), &policy, &ctx)
        .await)
}

/// Execute `ssm-seed deploy`
///
/// # Errors
///
/// Returns an error for invalid input (empty stage) or when the report
/// cannot be serialized. Store failures are reported, not returned.
pub async fn deploy(args: &DeployArgs) -> Result<ExitCode> {
    let manifest = prepare(args);
    let store = store_for(args, &manifest).await;
    let report = seed(args, &manifest, store).await?;

    match args.output {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report.sorted()).context("Failed to serialize report")?
        ),
    }

    if args.print_metrics {
        eprint!("{}", metrics::render_metrics()?);
    }

    Ok(exit_code(&report, args))
}

/// Dispatch a parsed command line
///
/// # Errors
///
/// Propagates errors from the selected command.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Deploy(args) => deploy(&args).await,
    }
}
