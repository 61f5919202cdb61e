//! # Planning
//!
//! Decides, without touching the network, which declared keys get written
//! and with what. Runs the stage gate first so a closed gate costs nothing.

use super::types::{
    Classification, DeclaredEnvironment, Outcome, SkipReason, StageSkipped, UpsertRequest,
};
use crate::policy::{ResolutionContext, SyncPolicy};
use crate::reference::ReferencePattern;
use tracing::{debug, info};

/// Requests to submit plus the keys already settled as skipped
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub requests: Vec<UpsertRequest>,
    pub skipped: Vec<Outcome>,
}

/// Build the plan for one run
///
/// # Errors
///
/// Returns [`StageSkipped`] when the policy restricts stages and the
/// context's stage is not among them.
pub fn plan(
    declared: &DeclaredEnvironment,
    policy: &SyncPolicy,
    ctx: &ResolutionContext,
    pattern: &ReferencePattern,
) -> Result<Plan, StageSkipped> {
    let stage = ctx.stage();
    if !policy.allows_stage(stage) {
        return Err(StageSkipped {
            stage: stage.to_string(),
            allowed_stages: policy.allowed_stages.clone(),
        });
    }

    let mut plan = Plan::default();
    for (key, expression) in declared {
        match resolve_key(key, expression, policy, ctx, pattern) {
            Ok(request) => plan.requests.push(request),
            Err(reason) => plan.skipped.push(Outcome::Skipped {
                key: key.clone(),
                reason,
            }),
        }
    }
    Ok(plan)
}

fn resolve_key(
    key: &str,
    expression: &str,
    policy: &SyncPolicy,
    ctx: &ResolutionContext,
    pattern: &ReferencePattern,
) -> Result<UpsertRequest, SkipReason> {
    if policy.is_ignored(key) {
        debug!("Ignoring '{}'", key);
        return Err(SkipReason::Ignored);
    }

    if !pattern.matches(expression) {
        debug!("'{}' is not a parameter store reference, leaving it alone", key);
        return Err(SkipReason::NotReference);
    }

    let Some(value) = policy.effective_default().or_else(|| ctx.env_value(key)) else {
        info!("Missing value for '{}'.", key);
        return Err(SkipReason::MissingValue);
    };

    let classification = if policy.is_secure(key) {
        Classification::Secure
    } else {
        Classification::Plain
    };

    Ok(UpsertRequest::new(ctx.stage(), key, value, classification))
}
