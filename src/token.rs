//! Unverified decoding of compact (JWS-style) tokens.
//!
//! The access tokens issued by the provider are opaque to this crate for
//! all trust purposes, but their payload segment carries identity fields
//! that are useful for diagnostics and display. Nothing here checks a
//! signature: **the output of this module must never feed an authorization
//! decision.** Session validity is decided by [`crate::SessionManager`]
//! against the provider-supplied expiry, not by these claims.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

use crate::clock::{self, RawExpiry};

/// Claims extracted from a token payload. All fields are optional because
/// the provider has shipped several claim sets over time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnverifiedClaims {
    /// Subject — the user id.
    pub sub: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "displayName")]
    pub name: Option<String>,
    /// Expiration stamp in whatever unit the issuer chose.
    pub exp: Option<RawExpiry>,
}

/// Decodes the payload segment of a compact token without verification.
///
/// Returns `None` if the token is not three dot-separated segments, the
/// payload is not base64url, or the payload is not a JSON object.
pub fn decode(token: &str) -> Option<UnverifiedClaims> {
    let mut segments = token.split('.');
    let _header = segments.next()?;
    let payload = segments.next()?;
    if segments.next().is_none() || payload.is_empty() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// The `sub` claim, if the token decodes.
pub fn user_id(token: &str) -> Option<String> {
    decode(token)?.sub
}

/// The `email` claim, if the token decodes.
pub fn email(token: &str) -> Option<String> {
    decode(token)?.email
}

/// The `exp` claim normalized to epoch milliseconds, if present and numeric.
pub fn expiration_millis(token: &str) -> Option<i64> {
    clock::normalize_to_millis(&decode(token)?.exp?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn forge(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(b"{\"alg\":\"none\"}");
        let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
        format!("{header}.{body}.sig")
    }

    #[test]
    fn test_decode_extracts_claims() {
        let token = forge(json!({
            "sub": "user-7",
            "email": "u@example.com",
            "exp": 1_700_000_000,
        }));

        let claims = decode(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("user-7"));
        assert_eq!(claims.email.as_deref(), Some("u@example.com"));

        assert_eq!(user_id(&token).as_deref(), Some("user-7"));
        assert_eq!(email(&token).as_deref(), Some("u@example.com"));
        // seconds epoch is scaled to millis
        assert_eq!(expiration_millis(&token), Some(1_700_000_000_000));
    }

    #[test]
    fn test_decode_string_exp() {
        let token = forge(json!({"exp": "1700000000000"}));
        assert_eq!(expiration_millis(&token), Some(1_700_000_000_000));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode("").is_none());
        assert!(decode("only-one-segment").is_none());
        assert!(decode("two.segments").is_none());
        assert!(decode("a.!!!notbase64!!!.c").is_none());

        let not_json = format!("h.{}.s", URL_SAFE_NO_PAD.encode(b"plain text"));
        assert!(decode(&not_json).is_none());
    }

    #[test]
    fn test_missing_claims_are_none() {
        let token = forge(json!({"iss": "someone"}));
        let claims = decode(&token).unwrap();
        assert!(claims.sub.is_none());
        assert!(claims.exp.is_none());
        assert!(expiration_millis(&token).is_none());
    }
}
