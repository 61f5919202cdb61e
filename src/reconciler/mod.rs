//! # Reconciler
//!
//! Seeds the parameter store from the declared environment.
//!
//! ## Reconciliation Flow
//!
//! 1. Stage gate: stop before any network call if the stage is not enabled
//! 2. Plan each declared key: ignore list, reference check, value resolution,
//!    secure/plain classification (see [`plan`])
//! 3. Submit the resulting writes concurrently, bounded by the concurrency limit
//! 4. Collect one outcome per key into a [`RunReport`]
//!
//! Nothing in a run is fatal. Missing values and store failures are recorded
//! per key and the remaining keys still go through.

pub mod plan;
pub mod types;

pub use plan::{plan, Plan};
pub use types::{
    parameter_path, Classification, DeclaredEnvironment, Outcome, RunReport, RunSummary,
    SkipReason, StageSkipped, UpsertRequest,
};

use crate::constants::DEFAULT_CONCURRENCY;
use crate::observability::metrics;
use crate::policy::{ResolutionContext, SyncPolicy};
use crate::provider::ParameterStore;
use crate::reference::ReferencePattern;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Drives seeding runs against one parameter store
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn ParameterStore>,
    pattern: ReferencePattern,
    concurrency: usize,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("store", &self.store.name())
            .field("pattern", &self.pattern)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl Reconciler {
    pub fn new(store: Arc<dyn ParameterStore>) -> Self {
        Self {
            store,
            pattern: ReferencePattern::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    #[must_use]
    pub fn with_reference_pattern(mut self, pattern: ReferencePattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Maximum writes in flight; values below 1 are raised to 1
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run one reconciliation
    pub async fn reconcile(
        &self,
        declared: &DeclaredEnvironment,
        policy: &SyncPolicy,
        ctx: &ResolutionContext,
    ) -> RunReport {
        let start = Instant::now();
        metrics::increment_runs();

        let plan = match plan(declared, policy, ctx, &self.pattern) {
            Ok(plan) => plan,
            Err(skipped) => {
                info!(
                    "Stage '{}' is not enabled for ssm-seed. Allowed stages: {}.",
                    skipped.stage,
                    skipped.allowed_stages.join(",")
                );
                let outcome = Outcome::StageSkipped(skipped);
                metrics::record_outcome(&outcome);
                metrics::observe_run_duration(start.elapsed().as_secs_f64());
                return RunReport {
                    stage: ctx.stage().to_string(),
                    outcomes: vec![outcome],
                };
            }
        };

        info!("Setting SSM params for stage '{}'.", ctx.stage());

        let store = self.store.as_ref();
        let submitted: Vec<Outcome> = stream::iter(plan.requests)
            .map(|request| submit(store, request))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut outcomes = plan.skipped;
        outcomes.extend(submitted);
        for outcome in &outcomes {
            metrics::record_outcome(outcome);
        }
        metrics::observe_run_duration(start.elapsed().as_secs_f64());

        let report = RunReport {
            stage: ctx.stage().to_string(),
            outcomes,
        };
        let summary = report.summary();
        info!(
            "Finished stage '{}': {} set, {} skipped, {} failed",
            report.stage, summary.upserted, summary.skipped, summary.failed
        );
        report
    }
}

/// Run one reconciliation with the default reference pattern and concurrency
pub async fn reconcile(
    declared: &DeclaredEnvironment,
    policy: &SyncPolicy,
    ctx: &ResolutionContext,
    store: Arc<dyn ParameterStore>,
) -> RunReport {
    Reconciler::new(store).reconcile(declared, policy, ctx).await
}

async fn submit(store: &dyn ParameterStore, request: UpsertRequest) -> Outcome {
    info!("Setting '{}'.", request.key);

    let start = Instant::now();
    let result = store.put_parameter(&request).await;
    metrics::observe_put_parameter_duration(store.name(), start.elapsed().as_secs_f64());

    match result {
        Ok(()) => Outcome::Upserted {
            key: request.key,
            path: request.path,
            classification: request.classification,
        },
        Err(e) => {
            warn!("{} {}", e, request.key);
            Outcome::Failed {
                already_exists: e.is_already_exists(),
                message: e.to_string(),
                key: request.key,
            }
        }
    }
}
