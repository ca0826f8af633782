//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routes reference existing profiles)
//! - Validate list entries (IPv4 or IPv4 CIDR only)
//! - Check that every signed token profile has a key source
//! - Require at least one profile per route
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GuardConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{GuardConfig, ProfileSettings};
use crate::net::cidr::is_valid_ipv4_or_cidr;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("profile name must not be empty")]
    EmptyProfileName,

    #[error("duplicated profile name: {0}")]
    DuplicateProfile(String),

    #[error("profile {profile}: invalid IPv4/CIDR entry {range:?}")]
    InvalidRange { profile: String, range: String },

    #[error("profile {0}: signed token profile needs `secret` or `secret_env`")]
    MissingSecret(String),

    #[error("profile {profile}: issuance_session_pointer {pointer:?} must start with '/'")]
    InvalidPointer { profile: String, pointer: String },

    #[error("profile {0}: max_age_secs must be greater than zero")]
    ZeroMaxAge(String),

    #[error("duplicated route name: {0}")]
    DuplicateRoute(String),

    #[error("route {0}: at least one profile is required")]
    EmptyRoute(String),

    #[error("route {route}: unknown profile {profile}")]
    UnknownProfile { route: String, profile: String },

    #[error("metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for profile in &config.profiles {
        if profile.name.is_empty() {
            errors.push(ValidationError::EmptyProfileName);
        } else if !names.insert(profile.name.as_str()) {
            errors.push(ValidationError::DuplicateProfile(profile.name.clone()));
        }

        match &profile.settings {
            ProfileSettings::AllowList { ranges } | ProfileSettings::DenyList { ranges } => {
                for range in ranges.iter().filter(|r| !is_valid_ipv4_or_cidr(r)) {
                    errors.push(ValidationError::InvalidRange {
                        profile: profile.name.clone(),
                        range: range.clone(),
                    });
                }
            }
            ProfileSettings::SignedToken(token) => {
                if token.secret.is_none() && token.secret_env.is_none() {
                    errors.push(ValidationError::MissingSecret(profile.name.clone()));
                }
                if let Some(pointer) = &token.issuance_session_pointer {
                    if !pointer.starts_with('/') {
                        errors.push(ValidationError::InvalidPointer {
                            profile: profile.name.clone(),
                            pointer: pointer.clone(),
                        });
                    }
                }
                if token.max_age_secs == Some(0) {
                    errors.push(ValidationError::ZeroMaxAge(profile.name.clone()));
                }
            }
        }
    }

    let mut routes = HashSet::new();
    for route in &config.routes {
        if !routes.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.name.clone()));
        }
        if route.profiles.is_empty() {
            errors.push(ValidationError::EmptyRoute(route.name.clone()));
        }
        for name in route.profiles.iter().filter(|n| !names.contains(n.as_str())) {
            errors.push(ValidationError::UnknownProfile {
                route: route.name.clone(),
                profile: name.clone(),
            });
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> GuardConfig {
        toml::from_str(raw).unwrap()
    }

    #[test]
    fn test_valid_config() {
        let config = parse(
            r#"
            [[profiles]]
            name = "office"
            kind = "allow-list"
            ranges = ["10.0.0.0/8"]

            [[profiles]]
            name = "csrf"
            kind = "signed-token"
            secret_env = "CSRF_SECRET"

            [[routes]]
            name = "admin"
            profiles = ["office", "csrf"]
            "#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let config = parse(
            r#"
            [[profiles]]
            name = "office"
            kind = "allow-list"
            ranges = ["10.0.0.0/33", "fe80::1"]

            [[profiles]]
            name = "office"
            kind = "deny-list"

            [[profiles]]
            name = "csrf"
            kind = "signed-token"
            issuance_session_pointer = "user/id"

            [[routes]]
            name = "admin"
            profiles = ["ghost"]
            "#,
        );
        let errors = validate_config(&config).unwrap_err();

        assert!(errors.contains(&ValidationError::DuplicateProfile("office".into())));
        assert!(errors.contains(&ValidationError::MissingSecret("csrf".into())));
        assert!(errors.contains(&ValidationError::UnknownProfile {
            route: "admin".into(),
            profile: "ghost".into(),
        }));
        assert_eq!(
            errors
                .iter()
                .filter(|e| matches!(e, ValidationError::InvalidRange { .. }))
                .count(),
            2
        );
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidPointer { .. })));
    }

    #[test]
    fn test_route_without_profiles() {
        let config = parse(
            r#"
            [[routes]]
            name = "open"
            profiles = []
            "#,
        );
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::EmptyRoute("open".into())]
        );
    }

    #[test]
    fn test_metrics_address_checked_when_enabled() {
        let mut config = GuardConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidMetricsAddress("nowhere".into())]
        );
    }
}
