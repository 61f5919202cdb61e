//! # ssm-seed
//!
//! Seeds AWS Systems Manager Parameter Store with the values behind the
//! `${ssm:...}` references declared in a deployment manifest, so the deploy
//! that follows finds every parameter it expects.
//!
//! ## Overview
//!
//! 1. **Read the manifest** - `provider.environment` and `custom.ssm` from `serverless.yml`
//! 2. **Gate on stage** - skip the whole run unless the stage is enabled
//! 3. **Resolve values** - `--ssm-default` or the process environment (after `.env`)
//! 4. **Seed** - create `/<stage>/<KEY>` parameters without overwriting existing ones
//!
//! See `ssm-seed deploy --help` for all options.

use anyhow::Result;
use clap::Parser;
use ssm_seed::cli::{self, Cli};
use ssm_seed::observability::{logging, metrics};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    logging::init_logging(cli.verbose);
    metrics::register_metrics()?;

    cli::run(cli).await
}
