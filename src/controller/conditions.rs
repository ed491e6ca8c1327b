//! Condition helpers for reading helm-controller status
//!
//! The executor never writes conditions; it only inspects the ones the
//! helm-controller reports to decide whether a release has converged.

use crate::crd::{Condition, HelmReleaseStatus};

/// Standard condition types reported by the helm-controller
pub const CONDITION_TYPE_READY: &str = "Ready";
pub const CONDITION_TYPE_STALLED: &str = "Stalled";

/// Standard condition statuses
pub const CONDITION_STATUS_TRUE: &str = "True";
pub const CONDITION_STATUS_FALSE: &str = "False";
pub const CONDITION_STATUS_UNKNOWN: &str = "Unknown";

/// Find a condition by type
pub fn find_condition<'a>(conditions: &'a [Condition], type_: &str) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.type_ == type_)
}

/// Check if a condition is true
pub fn is_condition_true(conditions: &[Condition], type_: &str) -> bool {
    find_condition(conditions, type_)
        .map(|c| c.status == CONDITION_STATUS_TRUE)
        .unwrap_or(false)
}

/// Whether the controller has caught up with `generation`
///
/// Unknown generations on either side count as observed.
pub fn is_generation_observed(status: &HelmReleaseStatus, generation: Option<i64>) -> bool {
    match (status.observed_generation, generation) {
        (Some(observed), Some(generation)) => observed >= generation,
        _ => true,
    }
}

/// A release is ready when Ready=True for the current generation
pub fn is_ready(status: Option<&HelmReleaseStatus>, generation: Option<i64>) -> bool {
    status
        .map(|s| {
            is_generation_observed(s, generation)
                && is_condition_true(&s.conditions, CONDITION_TYPE_READY)
        })
        .unwrap_or(false)
}

/// Returns the stalled condition when the controller gave up on the current generation
pub fn stalled_condition(
    status: Option<&HelmReleaseStatus>,
    generation: Option<i64>,
) -> Option<&Condition> {
    let status = status?;
    if !is_generation_observed(status, generation) {
        return None;
    }
    find_condition(&status.conditions, CONDITION_TYPE_STALLED)
        .filter(|c| c.status == CONDITION_STATUS_TRUE)
}

/// Short human-readable summary of the Ready condition for logs
pub fn ready_summary(status: Option<&HelmReleaseStatus>) -> String {
    status
        .and_then(|s| find_condition(&s.conditions, CONDITION_TYPE_READY))
        .map(|c| format!("Ready={} ({}): {}", c.status, c.reason, c.message))
        .unwrap_or_else(|| format!("Ready={CONDITION_STATUS_UNKNOWN}"))
}
