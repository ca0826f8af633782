//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Count profile verdicts, policy decisions and token outcomes
//! - Expose a Prometheus-compatible scrape endpoint when enabled
//!
//! # Metrics
//! - `guard_profile_verdicts_total` (counter): verdicts by profile, verdict
//! - `guard_decisions_total` (counter): decisions by operator, outcome
//! - `guard_tokens_issued_total` (counter): issued tokens by profile
//! - `guard_tokens_rejected_total` (counter): rejected tokens by profile, reason
//!
//! # Design Decisions
//! - Counters are no-ops until a recorder is installed, so tests need none
//! - Labels carry profile names only, never addresses or session ids

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::policy::Operator;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_profile_verdict(profile: &str, allowed: bool) {
    ::metrics::counter!(
        "guard_profile_verdicts_total",
        "profile" => profile.to_string(),
        "verdict" => outcome(allowed)
    )
    .increment(1);
}

pub fn record_decision(operator: Operator, allowed: bool) {
    ::metrics::counter!(
        "guard_decisions_total",
        "operator" => operator.as_str(),
        "outcome" => outcome(allowed)
    )
    .increment(1);
}

pub fn record_token_issued(profile: &str) {
    ::metrics::counter!("guard_tokens_issued_total", "profile" => profile.to_string()).increment(1);
}

/// `reason` is one of `missing`, `malformed`, `signature`, `session`, `expired`.
pub fn record_token_rejected(profile: &str, reason: &'static str) {
    ::metrics::counter!(
        "guard_tokens_rejected_total",
        "profile" => profile.to_string(),
        "reason" => reason
    )
    .increment(1);
}

fn outcome(allowed: bool) -> &'static str {
    if allowed {
        "allow"
    } else {
        "deny"
    }
}
