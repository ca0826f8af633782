//! Security profile subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     code or config (configured.rs)
//!     → registry.rs (name → Profile, duplicates rejected)
//!     → frozen ProfileRegistry shared via Arc
//!
//! Per request:
//!     Profile::validate(subject)
//!     → ip_list.rs (allow/deny membership)
//!     → signed_token.rs (x-csrf-token verification)
//!     → bool verdict (logged + counted)
//! ```
//!
//! # Design Decisions
//! - Narrow capability traits; the aggregator only sees `Profile::validate`
//! - `Capability` is a tagged variant, not an inheritance chain
//! - Profiles hold no per-request state and are shared across tasks

pub mod configured;
pub mod ip_list;
pub mod registry;
pub mod signed_token;
pub mod types;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::error::{GuardError, GuardResult};
use crate::observability::metrics;

pub use ip_list::{StaticAllowList, StaticDenyList};
pub use registry::{ProfileRegistry, ProfileRegistryBuilder};
pub use signed_token::{HmacTokenProfile, SignedTokenProfile};
pub use types::{IssuanceContext, RequestContext, SessionId, Subject};

/// Supplies the ranges a client address must fall into.
#[async_trait]
pub trait AllowListProfile: Send + Sync {
    /// IPv4 addresses or CIDR blocks, in order. Empty allows nobody.
    async fn allow_list(&self) -> GuardResult<Vec<String>>;
}

/// Supplies the ranges a client address must stay out of.
#[async_trait]
pub trait DenyListProfile: Send + Sync {
    /// IPv4 addresses or CIDR blocks, in order. Empty denies nobody.
    async fn deny_list(&self) -> GuardResult<Vec<String>>;
}

/// Which capability set a profile implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProfileKind {
    AllowList,
    DenyList,
    SignedToken,
}

impl ProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::AllowList => "allow-list",
            ProfileKind::DenyList => "deny-list",
            ProfileKind::SignedToken => "signed-token",
        }
    }

    pub fn is_ip_list(&self) -> bool {
        matches!(self, ProfileKind::AllowList | ProfileKind::DenyList)
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A profile implementation behind one of the capability traits.
#[derive(Clone)]
pub enum Capability {
    AllowList(Arc<dyn AllowListProfile>),
    DenyList(Arc<dyn DenyListProfile>),
    SignedToken(Arc<dyn SignedTokenProfile>),
}

impl Capability {
    pub fn allow_list(profile: impl AllowListProfile + 'static) -> Self {
        Capability::AllowList(Arc::new(profile))
    }

    pub fn deny_list(profile: impl DenyListProfile + 'static) -> Self {
        Capability::DenyList(Arc::new(profile))
    }

    pub fn signed_token(profile: impl SignedTokenProfile + 'static) -> Self {
        Capability::SignedToken(Arc::new(profile))
    }

    pub fn kind(&self) -> ProfileKind {
        match self {
            Capability::AllowList(_) => ProfileKind::AllowList,
            Capability::DenyList(_) => ProfileKind::DenyList,
            Capability::SignedToken(_) => ProfileKind::SignedToken,
        }
    }
}

/// A named, stateless policy unit.
#[derive(Clone)]
pub struct Profile {
    name: Arc<str>,
    capability: Capability,
}

impl Profile {
    pub fn new(name: impl Into<String>, capability: Capability) -> Self {
        Self {
            name: Arc::from(name.into()),
            capability,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ProfileKind {
        self.capability.kind()
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// Evaluate this profile against `subject`.
    ///
    /// IP profiles accept either subject form; a request without a client
    /// address fails with [`GuardError::MissingClientIp`]. Token profiles
    /// need a request.
    pub async fn validate(&self, subject: &Subject<'_>) -> GuardResult<bool> {
        let verdict = match &self.capability {
            Capability::AllowList(profile) => {
                let address = self.address_of(subject)?;
                let entries = profile.allow_list().await?;
                ip_list::allow_verdict(self.name(), &entries, &address)?
            }
            Capability::DenyList(profile) => {
                let address = self.address_of(subject)?;
                let entries = profile.deny_list().await?;
                ip_list::deny_verdict(self.name(), &entries, &address)?
            }
            Capability::SignedToken(profile) => match subject {
                Subject::Request(req) => {
                    signed_token::verify_request(self.name(), profile.as_ref(), req).await?
                }
                Subject::Address(_) => {
                    return Err(GuardError::UnsupportedSubject {
                        profile: self.name().to_string(),
                        expected: "request",
                    })
                }
            },
        };

        tracing::debug!(
            profile = %self.name,
            kind = %self.kind(),
            verdict,
            "Profile evaluated"
        );
        metrics::record_profile_verdict(self.name(), verdict);
        Ok(verdict)
    }

    /// Issue a token through this profile.
    pub async fn generate_token(&self, ctx: &IssuanceContext<'_>) -> GuardResult<String> {
        match &self.capability {
            Capability::SignedToken(profile) => {
                signed_token::generate_token(self.name(), profile.as_ref(), ctx).await
            }
            _ => Err(GuardError::NotTokenCapable(self.name().to_string())),
        }
    }

    /// Verify `token` against the session derived from `req`.
    pub async fn verify_token(&self, token: &str, req: &RequestContext) -> GuardResult<bool> {
        match &self.capability {
            Capability::SignedToken(profile) => {
                signed_token::verify_token(self.name(), profile.as_ref(), token, req).await
            }
            _ => Err(GuardError::NotTokenCapable(self.name().to_string())),
        }
    }

    fn address_of(&self, subject: &Subject<'_>) -> GuardResult<String> {
        subject.client_address().ok_or(GuardError::MissingClientIp)
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .finish()
    }
}
