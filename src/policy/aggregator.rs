//! Concurrent profile evaluation.
//!
//! # Responsibilities
//! - Start `validate` on every profile, join all, then reduce
//!
//! # Design Decisions
//! - No short-circuit: every named profile runs, so per-profile audit
//!   side effects are always observed
//! - No per-profile timeout; the slowest profile bounds the decision
//! - An error from any profile fails the decision after all have finished

use futures_util::future::join_all;

use super::operator::Operator;
use crate::error::GuardResult;
use crate::observability::metrics;
use crate::profile::{Profile, Subject};

/// Validate `subject` against every profile and combine the verdicts.
pub async fn apply_profiles(
    profiles: &[Profile],
    operator: Operator,
    subject: &Subject<'_>,
) -> GuardResult<bool> {
    let results = join_all(profiles.iter().map(|profile| profile.validate(subject))).await;
    let verdicts = results.into_iter().collect::<GuardResult<Vec<bool>>>()?;

    let allowed = operator.reduce(&verdicts);
    tracing::debug!(
        operator = %operator,
        profiles = profiles.len(),
        allowed,
        "Profiles applied"
    );
    metrics::record_decision(operator, allowed);
    Ok(allowed)
}
