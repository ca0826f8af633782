//! Policy evaluation entry points.
//!
//! # Responsibilities
//! - Short-circuit routes with no profiles attached
//! - Resolve names through the registry, then aggregate
//! - Turn a `false` decision into a typed denial
//! - Issue tokens through exactly one token-capable profile

use serde::{Deserialize, Serialize};

use super::aggregator::apply_profiles;
use super::operator::Operator;
use crate::config::schema::RoutePolicyConfig;
use crate::error::{GuardError, GuardResult};
use crate::profile::{IssuanceContext, Profile, ProfileKind, ProfileRegistry, Subject};

/// Which profiles guard a route and how their verdicts combine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoutePolicy {
    profiles: Vec<String>,
    operator: Operator,
}

impl RoutePolicy {
    pub fn new<I, S>(profiles: I, operator: Operator) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            profiles: profiles.into_iter().map(Into::into).collect(),
            operator,
        }
    }

    /// Like [`RoutePolicy::new`] with the operator given as text.
    pub fn parse<I, S>(profiles: I, operator: &str) -> GuardResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(profiles, operator.parse()?))
    }

    /// Client must match at least one allow list.
    pub fn ip_allow_list<I, S>(profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(profiles, Operator::AtLeastOne)
    }

    /// Client must pass every deny list.
    pub fn ip_deny_list<I, S>(profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(profiles, Operator::ForEvery)
    }

    /// Request must carry a token accepted by at least one profile.
    pub fn csrf<I, S>(profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(profiles, Operator::AtLeastOne)
    }

    /// Tokens are issued through this single profile.
    pub fn csrf_issue(profile: impl Into<String>) -> Self {
        Self::new([profile.into()], Operator::AtLeastOne)
    }

    pub fn profiles(&self) -> &[String] {
        &self.profiles
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// No profiles attached: the route is unguarded.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl From<&RoutePolicyConfig> for RoutePolicy {
    fn from(config: &RoutePolicyConfig) -> Self {
        Self::new(config.profiles.iter().cloned(), config.operator)
    }
}

/// Evaluates route policies against a frozen registry.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    registry: ProfileRegistry,
}

impl PolicyEngine {
    pub fn new(registry: ProfileRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Decide whether `subject` satisfies the named profiles.
    ///
    /// An empty name list allows without resolving anything. Unknown names
    /// fail with [`GuardError::ProfileNotFound`].
    pub async fn evaluate<S: AsRef<str>>(
        &self,
        names: &[S],
        operator: Operator,
        subject: &Subject<'_>,
    ) -> GuardResult<bool> {
        if names.is_empty() {
            return Ok(true);
        }
        let profiles = self.registry.resolve(names)?;
        apply_profiles(&profiles, operator, subject).await
    }

    /// Like [`PolicyEngine::evaluate`], but a denial becomes an error that
    /// names the profiles (and the client address for IP policies).
    pub async fn enforce(&self, policy: &RoutePolicy, subject: &Subject<'_>) -> GuardResult<()> {
        if policy.is_empty() {
            return Ok(());
        }

        let profiles = self.registry.resolve(policy.profiles())?;
        if apply_profiles(&profiles, policy.operator(), subject).await? {
            return Ok(());
        }

        let err = denial(&profiles, policy, subject);
        tracing::warn!(
            profiles = %policy.profiles().join(", "),
            operator = %policy.operator(),
            error = %err,
            "Security policy denied request"
        );
        Err(err)
    }

    /// Issue a token through the single profile named in `names`.
    pub async fn issue_token<S: AsRef<str>>(
        &self,
        names: &[S],
        ctx: &IssuanceContext<'_>,
    ) -> GuardResult<String> {
        if names.len() != 1 {
            return Err(GuardError::TokenProfileCount(names.len()));
        }
        let profiles = self.registry.resolve(names)?;
        match profiles.first() {
            Some(profile) => profile.generate_token(ctx).await,
            None => Err(GuardError::TokenProfileCount(0)),
        }
    }
}

fn denial(profiles: &[Profile], policy: &RoutePolicy, subject: &Subject<'_>) -> GuardError {
    let names = policy.profiles().join(", ");
    let all_ip = profiles.iter().all(|p| p.kind().is_ip_list());
    let all_token = profiles.iter().all(|p| p.kind() == ProfileKind::SignedToken);

    match subject.client_address() {
        Some(address) if all_ip => GuardError::ForbiddenAddress {
            profiles: names,
            address,
        },
        _ if all_token => GuardError::InvalidCsrfToken { profiles: names },
        _ => GuardError::Forbidden { profiles: names },
    }
}
