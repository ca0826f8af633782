//! Error taxonomy for the guard engine.
//!
//! Two families share one enum:
//! - configuration errors: deployment or wiring mistakes, never retried
//! - denials: expected per-request outcomes, mapped to 403 by the host

use thiserror::Error;

/// Errors raised while resolving or evaluating security profiles.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Two profiles were registered under the same name.
    #[error("Duplicated security profile name: {0}")]
    DuplicateProfile(String),

    /// A route policy references a profile that was never registered.
    #[error("Not Exist profile: {0}")]
    ProfileNotFound(String),

    /// Operator string is neither `at-least-one` nor `for-every`.
    #[error("Invalid profile operator: {0}")]
    InvalidOperator(String),

    /// A profile supplied a range that is not an IPv4 address or CIDR block.
    #[error("Invalid IPv4/CIDR entry {range:?} in profile {profile}")]
    InvalidRange { profile: String, range: String },

    /// Token issuance was attached to a profile without token capability.
    #[error("Not allowed profile({0}). Token issuance requires a signed token profile")]
    NotTokenCapable(String),

    /// Token issuance needs exactly one profile.
    #[error("Token issuance requires exactly one profile, got {0}")]
    TokenProfileCount(usize),

    /// A profile received a subject it cannot evaluate.
    #[error("Profile {profile} cannot validate this subject, expected {expected}")]
    UnsupportedSubject {
        profile: String,
        expected: &'static str,
    },

    /// A signed token profile could not produce its secret key.
    #[error("Secret key unavailable for profile {0}")]
    MissingSecret(String),

    /// Client address is not in the allow list, or is in a deny list.
    #[error("Forbidden IP address: {address}, profile name: {profiles}")]
    ForbiddenAddress { profiles: String, address: String },

    /// IP policy is attached but the request carries no client address.
    #[error("Missing client IP address in request")]
    MissingClientIp,

    /// CSRF token absent, malformed, forged, expired or bound to another session.
    #[error("Invalid CSRF token, profile name: {profiles}")]
    InvalidCsrfToken { profiles: String },

    /// Generic policy denial.
    #[error("Forbidden, profile name: {profiles}")]
    Forbidden { profiles: String },

    /// No session identity could be derived for token issuance.
    #[error("No session identity available for profile {0}")]
    MissingSessionId(String),

    /// Session identity is not visible ASCII or contains a token separator.
    #[error("Session identity for profile {0} contains a reserved or non-printable character")]
    InvalidSessionId(String),
}

impl GuardError {
    /// Returns true for errors caused by misconfiguration rather than by the caller.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GuardError::DuplicateProfile(_)
                | GuardError::ProfileNotFound(_)
                | GuardError::InvalidOperator(_)
                | GuardError::InvalidRange { .. }
                | GuardError::NotTokenCapable(_)
                | GuardError::TokenProfileCount(_)
                | GuardError::UnsupportedSubject { .. }
                | GuardError::MissingSecret(_)
        )
    }
}

/// Result type for guard operations.
pub type GuardResult<T> = Result<T, GuardError>;
