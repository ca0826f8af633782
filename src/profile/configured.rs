//! Profiles backed by the shared configuration snapshot.
//!
//! # Responsibilities
//! - Build the registry from `[[profiles]]` at startup
//! - Read list contents and secrets from the current snapshot on every call
//!
//! # Design Decisions
//! - Within one snapshot a profile is deterministic; a reload swaps the
//!   snapshot atomically between calls
//! - Secrets come from `secret` or from the variable named by `secret_env`,
//!   read at call time so rotation needs no restart

use async_trait::async_trait;
use std::time::Duration;

use super::signed_token::{issuance_session, session_from_request, SignedTokenProfile};
use super::types::{IssuanceContext, RequestContext};
use super::{AllowListProfile, Capability, DenyListProfile, ProfileRegistry};
use crate::config::schema::{ProfileSettings, SignedTokenConfig};
use crate::config::SharedConfig;
use crate::error::{GuardError, GuardResult};

/// Clone the settings of `name` out of the current snapshot.
fn current_settings(config: &SharedConfig, name: &str) -> GuardResult<ProfileSettings> {
    config
        .load()
        .profile(name)
        .map(|p| p.settings.clone())
        .ok_or_else(|| GuardError::ProfileNotFound(name.to_string()))
}

/// Allow list read from configuration.
#[derive(Debug, Clone)]
pub struct ConfiguredAllowList {
    name: String,
    config: SharedConfig,
}

impl ConfiguredAllowList {
    pub fn new(name: impl Into<String>, config: SharedConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

#[async_trait]
impl AllowListProfile for ConfiguredAllowList {
    async fn allow_list(&self) -> GuardResult<Vec<String>> {
        match current_settings(&self.config, &self.name)? {
            ProfileSettings::AllowList { ranges } => Ok(ranges),
            _ => Err(GuardError::ProfileNotFound(self.name.clone())),
        }
    }
}

/// Deny list read from configuration.
#[derive(Debug, Clone)]
pub struct ConfiguredDenyList {
    name: String,
    config: SharedConfig,
}

impl ConfiguredDenyList {
    pub fn new(name: impl Into<String>, config: SharedConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

#[async_trait]
impl DenyListProfile for ConfiguredDenyList {
    async fn deny_list(&self) -> GuardResult<Vec<String>> {
        match current_settings(&self.config, &self.name)? {
            ProfileSettings::DenyList { ranges } => Ok(ranges),
            _ => Err(GuardError::ProfileNotFound(self.name.clone())),
        }
    }
}

/// Signed token profile whose key and session sources come from configuration.
#[derive(Debug, Clone)]
pub struct ConfiguredTokenProfile {
    name: String,
    config: SharedConfig,
}

impl ConfiguredTokenProfile {
    pub fn new(name: impl Into<String>, config: SharedConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    fn settings(&self) -> GuardResult<SignedTokenConfig> {
        match current_settings(&self.config, &self.name)? {
            ProfileSettings::SignedToken(token) => Ok(token),
            _ => Err(GuardError::ProfileNotFound(self.name.clone())),
        }
    }
}

#[async_trait]
impl SignedTokenProfile for ConfiguredTokenProfile {
    async fn session_id_for_issuance(&self, ctx: &IssuanceContext<'_>) -> GuardResult<Option<String>> {
        let settings = self.settings()?;
        Ok(issuance_session(
            ctx,
            settings.session_header.as_deref(),
            settings.issuance_session_pointer.as_deref(),
        ))
    }

    async fn session_id_for_verification(&self, req: &RequestContext) -> GuardResult<Option<String>> {
        let settings = self.settings()?;
        Ok(session_from_request(req, settings.session_header.as_deref()))
    }

    async fn secret_key(&self) -> GuardResult<String> {
        let settings = self.settings()?;
        if let Some(secret) = settings.secret.filter(|s| !s.is_empty()) {
            return Ok(secret);
        }
        settings
            .secret_env
            .and_then(|var| std::env::var(var).ok())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| GuardError::MissingSecret(self.name.clone()))
    }

    fn max_age(&self) -> Option<Duration> {
        self.settings()
            .ok()
            .and_then(|s| s.max_age_secs)
            .map(Duration::from_secs)
    }
}

/// Register one profile per `[[profiles]]` entry of the current snapshot.
pub fn build_registry(config: &SharedConfig) -> GuardResult<ProfileRegistry> {
    let snapshot = config.load();
    let mut builder = ProfileRegistry::builder();

    for profile in &snapshot.profiles {
        let name = profile.name.clone();
        let capability = match &profile.settings {
            ProfileSettings::AllowList { .. } => {
                Capability::allow_list(ConfiguredAllowList::new(name.clone(), config.clone()))
            }
            ProfileSettings::DenyList { .. } => {
                Capability::deny_list(ConfiguredDenyList::new(name.clone(), config.clone()))
            }
            ProfileSettings::SignedToken(_) => {
                Capability::signed_token(ConfiguredTokenProfile::new(name.clone(), config.clone()))
            }
        };
        builder.register(name, capability)?;
    }

    Ok(builder.build())
}
