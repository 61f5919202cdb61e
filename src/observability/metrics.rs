//! # Metrics
//!
//! Prometheus metrics for seeding runs.
//!
//! ## Metrics Exposed
//!
//! - `ssm_seed_runs_total` - Total number of runs
//! - `ssm_seed_stage_skips_total` - Runs stopped by the stage gate
//! - `ssm_seed_run_duration_seconds` - Duration of a run
//! - `ssm_seed_parameters_upserted_total{classification}` - Parameters written
//! - `ssm_seed_parameters_skipped_total{reason}` - Declared keys not written
//! - `ssm_seed_parameter_failures_total{kind}` - Failed writes (`already_exists` or `request`)
//! - `ssm_seed_put_parameter_duration_seconds{store}` - Duration of store calls
//!
//! A CLI run prints the text exposition with `--print-metrics`.

use crate::reconciler::{Classification, Outcome, SkipReason};
use anyhow::Result;
use prometheus::{Encoder, Histogram, HistogramVec, IntCounter, IntCounterVec, Registry, TextEncoder};
use std::sync::LazyLock;

// Metrics
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RUNS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("ssm_seed_runs_total", "Total number of seeding runs")
        .expect("Failed to create RUNS_TOTAL metric - this should never happen")
});

static STAGE_SKIPS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "ssm_seed_stage_skips_total",
        "Total number of runs stopped because the stage is not enabled",
    )
    .expect("Failed to create STAGE_SKIPS_TOTAL metric - this should never happen")
});

static RUN_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "ssm_seed_run_duration_seconds",
            "Duration of a seeding run in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create RUN_DURATION metric - this should never happen")
});

static PARAMETERS_UPSERTED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "ssm_seed_parameters_upserted_total",
            "Total number of parameters written by classification",
        ),
        &["classification"],
    )
    .expect("Failed to create PARAMETERS_UPSERTED_TOTAL metric - this should never happen")
});

static PARAMETERS_SKIPPED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "ssm_seed_parameters_skipped_total",
            "Total number of declared keys not written by reason",
        ),
        &["reason"],
    )
    .expect("Failed to create PARAMETERS_SKIPPED_TOTAL metric - this should never happen")
});

static PARAMETER_FAILURES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "ssm_seed_parameter_failures_total",
            "Total number of failed parameter writes by kind",
        ),
        &["kind"],
    )
    .expect("Failed to create PARAMETER_FAILURES_TOTAL metric - this should never happen")
});

static PUT_PARAMETER_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "ssm_seed_put_parameter_duration_seconds",
            "Duration of parameter store writes in seconds by store",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
        &["store"],
    )
    .expect("Failed to create PUT_PARAMETER_DURATION metric - this should never happen")
});

fn register(collector: Box<dyn prometheus::core::Collector>) -> Result<()> {
    match REGISTRY.register(collector) {
        Ok(()) | Err(prometheus::Error::AlreadyReg) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Register all metrics with the crate registry; safe to call more than once
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn register_metrics() -> Result<()> {
    register(Box::new(RUNS_TOTAL.clone()))?;
    register(Box::new(STAGE_SKIPS_TOTAL.clone()))?;
    register(Box::new(RUN_DURATION.clone()))?;
    register(Box::new(PARAMETERS_UPSERTED_TOTAL.clone()))?;
    register(Box::new(PARAMETERS_SKIPPED_TOTAL.clone()))?;
    register(Box::new(PARAMETER_FAILURES_TOTAL.clone()))?;
    register(Box::new(PUT_PARAMETER_DURATION.clone()))?;

    Ok(())
}

/// Prometheus text exposition of everything registered
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn render_metrics() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

pub fn increment_runs() {
    RUNS_TOTAL.inc();
}

pub fn increment_stage_skips() {
    STAGE_SKIPS_TOTAL.inc();
}

pub fn observe_run_duration(duration: f64) {
    RUN_DURATION.observe(duration);
}

pub fn increment_upserted(classification: Classification) {
    PARAMETERS_UPSERTED_TOTAL
        .with_label_values(&[classification.as_str()])
        .inc();
}

pub fn increment_skipped(reason: SkipReason) {
    PARAMETERS_SKIPPED_TOTAL
        .with_label_values(&[reason.as_str()])
        .inc();
}

pub fn increment_failures(kind: &str) {
    PARAMETER_FAILURES_TOTAL.with_label_values(&[kind]).inc();
}

pub fn observe_put_parameter_duration(store: &str, duration: f64) {
    PUT_PARAMETER_DURATION
        .with_label_values(&[store])
        .observe(duration);
}

/// Count a single outcome in the matching counter
pub fn record_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::StageSkipped(_) => increment_stage_skips(),
        Outcome::Upserted { classification, .. } => increment_upserted(*classification),
        Outcome::Skipped { reason, .. } => increment_skipped(*reason),
        Outcome::Failed { already_exists, .. } => increment_failures(if *already_exists {
            "already_exists"
        } else {
            "request"
        }),
    }
}
