//! Sealed session payloads for cookie-backed deployments.
//!
//! The session record is serialized, base64url-encoded, and signed with
//! HMAC-SHA256, making the cookie value tamper-proof. The payload is signed
//! but not encrypted at this layer; deployments that need confidentiality
//! wrap the value at the transport.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::crypto::SecretString;

use super::Session;

type HmacSha256 = Hmac<Sha256>;

/// Seals a session into a signed cookie value.
///
/// Returns a string in the format `{payload}.{signature}` where the payload
/// is the base64url-encoded record and the signature is hex-encoded
/// HMAC-SHA256 over the payload.
pub fn seal_session(session: &Session, secret: &SecretString) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(session)?;
    let payload = URL_SAFE_NO_PAD.encode(json);
    let signature = compute_hmac(payload.as_bytes(), secret.expose_secret().as_bytes());
    Ok(format!("{}.{}", payload, hex::encode(signature)))
}

/// Verifies a sealed cookie value and extracts the session record.
///
/// Returns `None` if the signature is invalid (tampered) or the payload
/// does not decode to a session record.
pub fn unseal_session(value: &str, secret: &SecretString) -> Option<Session> {
    let (payload, signature_hex) = value.rsplit_once('.')?;

    let actual_sig = hex::decode(signature_hex).ok()?;
    let expected_sig = compute_hmac(payload.as_bytes(), secret.expose_secret().as_bytes());

    if !constant_time_eq(&expected_sig, &actual_sig) {
        log::warn!(
            target: "vestibule::session",
            "msg=\"sealed session tampered\" payload_prefix=\"{}...\"",
            &payload.chars().take(8).collect::<String>()
        );
        return None;
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Computes HMAC-SHA256.
///
/// # Panics
///
/// Cannot panic: HMAC-SHA256 accepts keys of any length.
fn compute_hmac(message: &[u8], key: &[u8]) -> Vec<u8> {
    #[allow(clippy::expect_used)]
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any size");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Constant-time comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionUser;
    use chrono::{Duration, Utc};

    fn sample_session() -> Session {
        Session {
            user: SessionUser {
                id: "user-1".to_owned(),
                email: "user1@example.com".to_owned(),
                display_name: Some("User One".to_owned()),
                role: Some("member".to_owned()),
                email_verified: true,
            },
            access_token: "access-token-value".into(),
            refresh_token: "refresh-token-value".into(),
            expires_at: Utc::now() + Duration::hours(1),
            issued_at: Utc::now(),
        }
    }

    #[test]
    fn test_seal_and_unseal() {
        let secret = SecretString::new("test-secret-key-that-is-long-enough");
        let session = sample_session();

        let sealed = seal_session(&session, &secret).unwrap();
        let opened = unseal_session(&sealed, &secret).unwrap();

        assert_eq!(opened.user, session.user);
        assert_eq!(opened.access_token, session.access_token);
        assert_eq!(opened.refresh_token, session.refresh_token);
        assert_eq!(opened.expires_at, session.expires_at);
    }

    #[test]
    fn test_tampered_signature() {
        let secret = SecretString::new("test-secret-key-that-is-long-enough");
        let sealed = seal_session(&sample_session(), &secret).unwrap();

        let payload = sealed.rsplit_once('.').unwrap().0;
        let tampered = format!("{}.{}", payload, "0".repeat(64));

        assert!(unseal_session(&tampered, &secret).is_none());
    }

    #[test]
    fn test_tampered_payload() {
        let secret = SecretString::new("test-secret-key-that-is-long-enough");
        let sealed = seal_session(&sample_session(), &secret).unwrap();

        let signature = sealed.rsplit_once('.').unwrap().1;
        let forged_payload = URL_SAFE_NO_PAD.encode(b"{\"user\":\"someone-else\"}");
        let tampered = format!("{forged_payload}.{signature}");

        assert!(unseal_session(&tampered, &secret).is_none());
    }

    #[test]
    fn test_wrong_secret() {
        let secret1 = SecretString::new("secret-key-one-that-is-long-enough");
        let secret2 = SecretString::new("secret-key-two-that-is-long-enough");

        let sealed = seal_session(&sample_session(), &secret1).unwrap();
        assert!(unseal_session(&sealed, &secret2).is_none());
    }

    #[test]
    fn test_malformed_values() {
        let secret = SecretString::new("test-secret-key-that-is-long-enough");

        assert!(unseal_session("noseparator", &secret).is_none());
        assert!(unseal_session("payload.notahexsignature", &secret).is_none());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hello!"));
        assert!(constant_time_eq(b"", b""));
    }
}
