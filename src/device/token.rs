//! Local look at a device token's `exp` claim.
//!
//! Only used to report stale credentials to the check-in tool. The backend
//! stays the authority on whether a token is valid.

use chrono::{DateTime, Utc};

/// Expiry encoded in the token, if it can be read.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(decode_exp(token)?, 0)
}

/// Whether `token` carries a readable `exp` that is before `now`.
///
/// Device tokens are opaque to the client, so a token without a readable
/// `exp` is never reported as expired.
pub fn token_expired(token: &str, now: DateTime<Utc>) -> bool {
    decode_exp(token).is_some_and(|exp| exp < now.timestamp())
}

fn decode_exp(token: &str) -> Option<i64> {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    let payload = token.split('.').nth(1)?;
    let decoded = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&decoded).ok()?;
    let exp = claims.get("exp")?;
    exp.as_i64().or_else(|| exp.as_f64().map(|secs| secs as i64))
}
