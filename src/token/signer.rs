//! HMAC-SHA256 signing for token messages.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex length of a SHA-256 digest.
pub const SIGNATURE_HEX_LEN: usize = 64;

/// Sign `message` with `key`, returning lowercase hex.
pub fn sign(key: &[u8], message: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Check `signature_hex` against `message` in constant time.
///
/// Only the canonical lowercase encoding produced by [`sign`] is accepted.
pub fn verify(key: &[u8], message: &str, signature_hex: &str) -> bool {
    let canonical = signature_hex.len() == SIGNATURE_HEX_LEN
        && signature_hex
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if !canonical {
        return false;
    }

    let Ok(expected) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
        return false;
    };
    mac.update(message.as_bytes());
    mac.verify_slice(&expected).is_ok()
}
