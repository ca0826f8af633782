//! Signed CSRF token profiles.
//!
//! # Responsibilities
//! - Derive the session identity for issuance and for verification
//! - Supply the secret key
//! - Issue and verify `<hmac>.<session>!<millis>!<nonce>` tokens
//!
//! # Design Decisions
//! - Both directions bind to the request's session identity; issuance may
//!   read it from the response payload instead when a JSON pointer is set
//! - Signature and session checks are both evaluated, then combined
//! - Expiry only when the profile declares a `max_age`

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

use super::types::{IssuanceContext, RequestContext};
use crate::error::{GuardError, GuardResult};
use crate::observability::metrics;
use crate::token::{codec, signer};

/// A profile able to issue and verify signed tokens.
#[async_trait]
pub trait SignedTokenProfile: Send + Sync {
    /// Session identity a new token is bound to.
    async fn session_id_for_issuance(&self, ctx: &IssuanceContext<'_>) -> GuardResult<Option<String>>;

    /// Session identity of the request presenting a token.
    async fn session_id_for_verification(&self, req: &RequestContext) -> GuardResult<Option<String>>;

    /// HMAC key.
    async fn secret_key(&self) -> GuardResult<String>;

    /// Maximum token age. `None` disables expiry.
    fn max_age(&self) -> Option<Duration> {
        None
    }
}

/// Issue a token for the session derived from `ctx`.
pub async fn generate_token(
    name: &str,
    profile: &dyn SignedTokenProfile,
    ctx: &IssuanceContext<'_>,
) -> GuardResult<String> {
    let session_id = profile
        .session_id_for_issuance(ctx)
        .await?
        .ok_or_else(|| GuardError::MissingSessionId(name.to_string()))?;
    if !codec::is_valid_session_id(&session_id) {
        return Err(GuardError::InvalidSessionId(name.to_string()));
    }

    let secret = profile.secret_key().await?;
    let message = codec::compose_message(&session_id, codec::now_millis(), &codec::generate_nonce());
    let signature = signer::sign(secret.as_bytes(), &message);

    tracing::debug!(profile = %name, "Signed token issued");
    metrics::record_token_issued(name);
    Ok(codec::compose_token(&signature, &message))
}

/// Verify `token` against the session derived from `req`.
pub async fn verify_token(
    name: &str,
    profile: &dyn SignedTokenProfile,
    token: &str,
    req: &RequestContext,
) -> GuardResult<bool> {
    let Some(parsed) = codec::parse(token) else {
        return Ok(reject(name, "malformed"));
    };

    let current_session = profile.session_id_for_verification(req).await?;
    let secret = profile.secret_key().await?;

    let signature_ok = signer::verify(secret.as_bytes(), parsed.message, parsed.signature);
    let session_ok = current_session.as_deref() == Some(parsed.session_id);

    if !signature_ok {
        return Ok(reject(name, "signature"));
    }
    if !session_ok {
        return Ok(reject(name, "session"));
    }

    if let Some(max_age) = profile.max_age() {
        let max_age_millis = u64::try_from(max_age.as_millis()).unwrap_or(u64::MAX);
        let fresh = parsed
            .timestamp_millis()
            .map(|issued| codec::now_millis().saturating_sub(issued) <= max_age_millis)
            .unwrap_or(false);
        if !fresh {
            return Ok(reject(name, "expired"));
        }
    }

    Ok(true)
}

/// Verify the `x-csrf-token` header of `req`. A missing header is a denial.
pub async fn verify_request(
    name: &str,
    profile: &dyn SignedTokenProfile,
    req: &RequestContext,
) -> GuardResult<bool> {
    match req.csrf_token() {
        Some(token) => verify_token(name, profile, token, req).await,
        None => Ok(reject(name, "missing")),
    }
}

fn reject(name: &str, reason: &'static str) -> bool {
    tracing::debug!(profile = %name, reason, "Signed token rejected");
    metrics::record_token_rejected(name, reason);
    false
}

/// Session identity from the `SessionId` extension, falling back to `header`.
pub fn session_from_request(req: &RequestContext, header: Option<&str>) -> Option<String> {
    req.session_id()
        .or_else(|| header.and_then(|h| req.header(h)))
        .map(str::to_owned)
}

/// String or number at `pointer` inside `payload`.
pub fn session_from_payload(payload: &Value, pointer: &str) -> Option<String> {
    match payload.pointer(pointer)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Issuance-side derivation shared by the built-in profiles.
pub fn issuance_session(
    ctx: &IssuanceContext<'_>,
    header: Option<&str>,
    payload_pointer: Option<&str>,
) -> Option<String> {
    let from_payload = match (payload_pointer, ctx.payload) {
        (Some(pointer), Some(payload)) => session_from_payload(payload, pointer),
        _ => None,
    };
    from_payload.or_else(|| ctx.request.and_then(|req| session_from_request(req, header)))
}

/// Token profile with an in-memory secret.
#[derive(Clone)]
pub struct HmacTokenProfile {
    secret: String,
    session_header: Option<String>,
    payload_pointer: Option<String>,
    max_age: Option<Duration>,
}

impl HmacTokenProfile {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            session_header: None,
            payload_pointer: None,
            max_age: None,
        }
    }

    /// Read the session identity from this header when no `SessionId` is attached.
    pub fn with_session_header(mut self, header: impl Into<String>) -> Self {
        self.session_header = Some(header.into());
        self
    }

    /// Read the issuance session identity from the payload at this JSON pointer.
    pub fn with_payload_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.payload_pointer = Some(pointer.into());
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }
}

impl fmt::Debug for HmacTokenProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacTokenProfile")
            .field("secret", &"[REDACTED]")
            .field("session_header", &self.session_header)
            .field("payload_pointer", &self.payload_pointer)
            .field("max_age", &self.max_age)
            .finish()
    }
}

#[async_trait]
impl SignedTokenProfile for HmacTokenProfile {
    async fn session_id_for_issuance(&self, ctx: &IssuanceContext<'_>) -> GuardResult<Option<String>> {
        Ok(issuance_session(
            ctx,
            self.session_header.as_deref(),
            self.payload_pointer.as_deref(),
        ))
    }

    async fn session_id_for_verification(&self, req: &RequestContext) -> GuardResult<Option<String>> {
        Ok(session_from_request(req, self.session_header.as_deref()))
    }

    async fn secret_key(&self) -> GuardResult<String> {
        Ok(self.secret.clone())
    }

    fn max_age(&self) -> Option<Duration> {
        self.max_age
    }
}
