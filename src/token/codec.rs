//! Signed token wire format.
//!
//! ```text
//! <hmac-hex>.<sessionId>!<timestampMillis>!<nonce>
//! ```
//!
//! # Design Decisions
//! - Parsing is purely structural and runs before any cryptographic work
//! - The message is kept as the exact substring after the `.`; signatures are
//!   checked against that slice, never against a re-joined string

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Separates the signature from the message.
pub const SIGNATURE_SEPARATOR: char = '.';

/// Separates the message fields.
pub const FIELD_SEPARATOR: char = '!';

/// Shortest string worth parsing as a token.
pub const MIN_TOKEN_LEN: usize = 10;

/// Nonce length; must be at least 10.
pub const NONCE_LEN: usize = 16;

/// A token split into its parts. Borrows from the input string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedToken<'a> {
    pub signature: &'a str,
    pub message: &'a str,
    pub session_id: &'a str,
    pub timestamp: &'a str,
    pub nonce: &'a str,
}

impl ParsedToken<'_> {
    /// Issue time in milliseconds, if the timestamp field is numeric.
    pub fn timestamp_millis(&self) -> Option<u64> {
        self.timestamp.parse().ok()
    }
}

/// Split a token into signature and message fields.
///
/// Returns `None` unless the token is at least [`MIN_TOKEN_LEN`] long, holds
/// exactly one `.` with non-empty halves, and the message has exactly three
/// non-empty `!`-separated fields.
pub fn parse(token: &str) -> Option<ParsedToken<'_>> {
    if token.len() < MIN_TOKEN_LEN {
        return None;
    }
    if token.matches(SIGNATURE_SEPARATOR).count() != 1 {
        return None;
    }

    let (signature, message) = token.split_once(SIGNATURE_SEPARATOR)?;
    if signature.is_empty() || message.is_empty() {
        return None;
    }

    let mut fields = message.split(FIELD_SEPARATOR);
    let session_id = fields.next()?;
    let timestamp = fields.next()?;
    let nonce = fields.next()?;
    if fields.next().is_some() || [session_id, timestamp, nonce].iter().any(|f| f.is_empty()) {
        return None;
    }

    Some(ParsedToken {
        signature,
        message,
        session_id,
        timestamp,
        nonce,
    })
}

/// Build the signed message `<sessionId>!<timestamp>!<nonce>`.
pub fn compose_message(session_id: &str, timestamp_millis: u64, nonce: &str) -> String {
    format!(
        "{session_id}{FIELD_SEPARATOR}{timestamp_millis}{FIELD_SEPARATOR}{nonce}"
    )
}

/// Join a signature and message into the wire token.
pub fn compose_token(signature: &str, message: &str) -> String {
    format!("{signature}{SIGNATURE_SEPARATOR}{message}")
}

/// Session identities are visible ASCII without either separator, so the
/// token always fits in a header value.
pub fn is_valid_session_id(session_id: &str) -> bool {
    !session_id.is_empty()
        && session_id.bytes().all(|b| b.is_ascii_graphic())
        && !session_id.contains(SIGNATURE_SEPARATOR)
        && !session_id.contains(FIELD_SEPARATOR)
}

/// Random alphanumeric nonce of [`NONCE_LEN`] characters.
pub fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

/// Current wall-clock time in milliseconds since the epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
