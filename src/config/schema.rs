//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the guard.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::policy::Operator;
use crate::profile::ProfileKind;

/// Root configuration for the guard.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    /// How the client address is derived from a request.
    pub client_ip: ClientIpConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Security profile definitions.
    pub profiles: Vec<ProfileConfig>,

    /// Named route policies.
    pub routes: Vec<RoutePolicyConfig>,
}

impl GuardConfig {
    /// Look up a profile definition by name.
    pub fn profile(&self, name: &str) -> Option<&ProfileConfig> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Look up a route policy by name.
    pub fn route(&self, name: &str) -> Option<&RoutePolicyConfig> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Profile names and kinds, sorted by name.
    pub fn profile_signature(&self) -> Vec<(String, ProfileKind)> {
        let mut sig: Vec<_> = self
            .profiles
            .iter()
            .map(|p| (p.name.clone(), p.settings.kind()))
            .collect();
        sig.sort();
        sig
    }

    /// Sections of `next` that differ from `self` but are only read at startup.
    ///
    /// Routes, client address extraction and observability are wired into the
    /// server once, as is the set of profile names and kinds.
    pub fn restart_required_changes(&self, next: &GuardConfig) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.profile_signature() != next.profile_signature() {
            changed.push("profiles");
        }
        if self.client_ip != next.client_ip {
            changed.push("client_ip");
        }
        if self.routes != next.routes {
            changed.push("routes");
        }
        if self.observability != next.observability {
            changed.push("observability");
        }
        changed
    }
}

/// Client address extraction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientIpConfig {
    /// Honour `X-Forwarded-For` / `X-Real-IP`. Enable only behind a trusted proxy.
    pub trust_forwarded_headers: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A security profile definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProfileConfig {
    /// Unique profile name, referenced by routes.
    pub name: String,

    /// Kind-specific settings, selected by the `kind` key.
    #[serde(flatten)]
    pub settings: ProfileSettings,
}

/// Kind-specific profile settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProfileSettings {
    AllowList {
        #[serde(default)]
        ranges: Vec<String>,
    },
    DenyList {
        #[serde(default)]
        ranges: Vec<String>,
    },
    SignedToken(SignedTokenConfig),
}

impl ProfileSettings {
    pub fn kind(&self) -> ProfileKind {
        match self {
            ProfileSettings::AllowList { .. } => ProfileKind::AllowList,
            ProfileSettings::DenyList { .. } => ProfileKind::DenyList,
            ProfileSettings::SignedToken(_) => ProfileKind::SignedToken,
        }
    }

    /// Ranges of an allow or deny list.
    pub fn ranges(&self) -> Option<&[String]> {
        match self {
            ProfileSettings::AllowList { ranges } | ProfileSettings::DenyList { ranges } => {
                Some(ranges)
            }
            ProfileSettings::SignedToken(_) => None,
        }
    }
}

/// Signed token profile settings.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SignedTokenConfig {
    /// Inline HMAC key. Prefer `secret_env` outside tests.
    pub secret: Option<String>,

    /// Environment variable holding the HMAC key.
    pub secret_env: Option<String>,

    /// Header carrying the session identity when no `SessionId` extension is set.
    pub session_header: Option<String>,

    /// JSON pointer into the response payload for the issuance session identity.
    pub issuance_session_pointer: Option<String>,

    /// Maximum token age in seconds. Unset disables expiry.
    pub max_age_secs: Option<u64>,
}

impl fmt::Debug for SignedTokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedTokenConfig")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("secret_env", &self.secret_env)
            .field("session_header", &self.session_header)
            .field("issuance_session_pointer", &self.issuance_session_pointer)
            .field("max_age_secs", &self.max_age_secs)
            .finish()
    }
}

/// A named route policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RoutePolicyConfig {
    /// Route identifier for logging.
    pub name: String,

    /// Profiles guarding the route, in evaluation order.
    pub profiles: Vec<String>,

    /// How verdicts combine (default: at-least-one).
    #[serde(default)]
    pub operator: Operator,
}
