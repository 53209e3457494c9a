//! Normalization of identity-provider responses into one outcome type.
//!
//! The provider has exposed at least three response shapes for the same
//! logical operations over its lifetime: a flat `token`/`refreshToken`/
//! `user` object, a nested `requires2FA` challenge object, and a
//! snake_case `access_token`/`refresh_token` pair. [`ProviderResponse`]
//! absorbs all of them through serde aliases so the "which shape did we
//! get" decision lives in exactly one place: [`resolve`].
//!
//! Precedence is fixed: a provider error wins over everything, a challenge
//! indicator wins over token fields, and only a complete token triple
//! authenticates. A body matching none of the shapes is a hard
//! [`AuthError::MalformedResponse`], never silently coerced.

use serde::{Deserialize, Deserializer};

use crate::clock::{self, RawExpiry};
use crate::crypto::SecretString;
use crate::session::{SessionUser, TokenGrant};
use crate::AuthError;

/// A raw provider response body, tolerant of every shape the provider has
/// shipped. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderResponse {
    pub error: Option<ProviderError>,

    #[serde(alias = "requires2FA", alias = "totp_required")]
    pub totp_required: bool,

    #[serde(alias = "challenge_token")]
    pub challenge_token: Option<SecretString>,

    #[serde(alias = "accessToken", alias = "access_token")]
    pub token: Option<SecretString>,

    #[serde(alias = "refresh_token")]
    pub refresh_token: Option<SecretString>,

    #[serde(alias = "expires_at")]
    pub expires_at: Option<RawExpiry>,

    pub user: Option<ProviderUser>,
}

impl ProviderResponse {
    /// Parses a decoded JSON body. A body that is not an object at all is
    /// already malformed.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, AuthError> {
        serde_json::from_value(value).map_err(|_| AuthError::MalformedResponse)
    }
}

/// A provider-level error, which has arrived both as a bare string and as
/// a `{message, code}` object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProviderError {
    Structured {
        #[serde(default)]
        message: Option<String>,
        #[serde(default, alias = "errorCode")]
        code: Option<String>,
    },
    Message(String),
}

impl ProviderError {
    pub fn message(&self) -> &str {
        match self {
            ProviderError::Structured { message, code } => message
                .as_deref()
                .or(code.as_deref())
                .unwrap_or("authentication failed"),
            ProviderError::Message(msg) => msg,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ProviderError::Structured { code, .. } => code.as_deref(),
            ProviderError::Message(_) => None,
        }
    }
}

/// The provider's user object; ids have arrived as both strings and
/// numbers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderUser {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    pub email: String,
    #[serde(alias = "displayName", alias = "display_name")]
    pub name: Option<String>,
    pub role: Option<String>,
    #[serde(alias = "email_verified", alias = "verified")]
    pub email_verified: bool,
}

impl From<ProviderUser> for SessionUser {
    fn from(user: ProviderUser) -> Self {
        SessionUser {
            id: user.id,
            email: user.email,
            display_name: user.name,
            role: user.role,
            email_verified: user.email_verified,
        }
    }
}

fn flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// The normalized result of an authentication attempt. Transient by
/// design: it exists only to decouple response parsing from use-case
/// logic and is never persisted.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// A complete token triple was issued. `user` is absent on refresh
    /// responses, which carry tokens only.
    Authenticated {
        user: Option<SessionUser>,
        grant: TokenGrant,
    },
    /// The password was accepted but a second factor is required.
    ChallengeRequired {
        challenge_token: SecretString,
        email: Option<String>,
    },
    /// The provider rejected the attempt; message and code pass through
    /// verbatim.
    Rejected {
        reason: String,
        code: Option<String>,
    },
}

/// Maps a raw response to an [`AuthOutcome`].
///
/// Decision order, in which earlier checks always win:
/// 1. provider error present → `Rejected`
/// 2. challenge indicator present (`totpRequired`/`requires2FA`, or a
///    challenge token with no access token) → `ChallengeRequired`
/// 3. access token + refresh token + expiry all present → `Authenticated`,
///    expiry normalized to an instant
/// 4. anything else → `Err(MalformedResponse)`
pub fn resolve(response: &ProviderResponse) -> Result<AuthOutcome, AuthError> {
    if let Some(error) = &response.error {
        return Ok(AuthOutcome::Rejected {
            reason: error.message().to_owned(),
            code: error.code().map(str::to_owned),
        });
    }

    let challenge_indicated = response.totp_required
        || (response.challenge_token.is_some() && response.token.is_none());
    if challenge_indicated {
        let Some(challenge_token) = response.challenge_token.clone() else {
            return Err(AuthError::MalformedResponse);
        };
        return Ok(AuthOutcome::ChallengeRequired {
            challenge_token,
            email: response.user.as_ref().map(|user| user.email.clone()),
        });
    }

    if let (Some(token), Some(refresh_token), Some(raw_expiry)) = (
        response.token.clone(),
        response.refresh_token.clone(),
        response.expires_at.as_ref(),
    ) {
        let Some(expires_at) = clock::normalize_to_instant(raw_expiry) else {
            return Err(AuthError::MalformedResponse);
        };

        return Ok(AuthOutcome::Authenticated {
            user: response.user.clone().map(SessionUser::from),
            grant: TokenGrant {
                access_token: token,
                refresh_token,
                expires_at,
            },
        });
    }

    Err(AuthError::MalformedResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> ProviderResponse {
        ProviderResponse::from_json_value(value).unwrap()
    }

    #[test]
    fn test_flat_camel_case_shape_authenticates() {
        let response = parse(json!({
            "token": "at",
            "refreshToken": "rt",
            "expiresAt": 1_700_000_000_000i64,
            "user": {"id": "u1", "email": "u@example.com", "displayName": "U", "emailVerified": true},
        }));

        match resolve(&response).unwrap() {
            AuthOutcome::Authenticated { user, grant } => {
                let user = user.unwrap();
                assert_eq!(user.id, "u1");
                assert_eq!(user.display_name.as_deref(), Some("U"));
                assert!(user.email_verified);
                assert_eq!(grant.access_token, "at".into());
                assert_eq!(grant.expires_at.timestamp_millis(), 1_700_000_000_000);
            }
            other => panic!("expected Authenticated, got {other:?}"),
        }
    }

    #[test]
    fn test_snake_case_shape_authenticates() {
        let response = parse(json!({
            "access_token": "at",
            "refresh_token": "rt",
            "expires_at": "1700000000",
            "user": {"id": 42, "email": "u@example.com", "verified": false},
        }));

        match resolve(&response).unwrap() {
            AuthOutcome::Authenticated { user, grant } => {
                assert_eq!(user.unwrap().id, "42");
                // seconds-epoch string normalized to the same instant
                assert_eq!(grant.expires_at.timestamp_millis(), 1_700_000_000_000);
            }
            other => panic!("expected Authenticated, got {other:?}"),
        }
    }

    #[test]
    fn test_challenge_shape() {
        let response = parse(json!({
            "requires2FA": true,
            "challengeToken": "c1",
        }));

        match resolve(&response).unwrap() {
            AuthOutcome::ChallengeRequired {
                challenge_token, ..
            } => assert_eq!(challenge_token, "c1".into()),
            other => panic!("expected ChallengeRequired, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_challenge_token_without_access_token() {
        let response = parse(json!({"challengeToken": "c1"}));

        assert!(matches!(
            resolve(&response).unwrap(),
            AuthOutcome::ChallengeRequired { .. }
        ));
    }

    #[test]
    fn test_error_takes_precedence_over_tokens() {
        let response = parse(json!({
            "error": {"message": "account locked", "code": "locked"},
            "token": "at",
            "refreshToken": "rt",
            "expiresAt": 1_700_000_000_000i64,
        }));

        match resolve(&response).unwrap() {
            AuthOutcome::Rejected { reason, code } => {
                assert_eq!(reason, "account locked");
                assert_eq!(code.as_deref(), Some("locked"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_string_error_shape() {
        let response = parse(json!({"error": "invalid credentials"}));

        match resolve(&response).unwrap() {
            AuthOutcome::Rejected { reason, code } => {
                assert_eq!(reason, "invalid credentials");
                assert!(code.is_none());
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_challenge_flag_beats_token_fields() {
        let response = parse(json!({
            "totpRequired": true,
            "challengeToken": "c1",
            "token": "at",
            "refreshToken": "rt",
            "expiresAt": 1_700_000_000_000i64,
        }));

        assert!(matches!(
            resolve(&response).unwrap(),
            AuthOutcome::ChallengeRequired { .. }
        ));
    }

    #[test]
    fn test_challenge_flag_without_token_is_malformed() {
        let response = parse(json!({"totpRequired": true}));
        assert_eq!(resolve(&response).unwrap_err(), AuthError::MalformedResponse);
    }

    #[test]
    fn test_incomplete_token_triple_is_malformed() {
        let missing_refresh = parse(json!({"token": "at", "expiresAt": 1_700_000_000i64}));
        assert_eq!(
            resolve(&missing_refresh).unwrap_err(),
            AuthError::MalformedResponse
        );

        let missing_expiry = parse(json!({"token": "at", "refreshToken": "rt"}));
        assert_eq!(
            resolve(&missing_expiry).unwrap_err(),
            AuthError::MalformedResponse
        );
    }

    #[test]
    fn test_unparseable_expiry_is_malformed() {
        let response = parse(json!({
            "token": "at",
            "refreshToken": "rt",
            "expiresAt": "whenever",
        }));
        assert_eq!(resolve(&response).unwrap_err(), AuthError::MalformedResponse);
    }

    #[test]
    fn test_empty_body_is_malformed() {
        let response = parse(json!({}));
        assert_eq!(resolve(&response).unwrap_err(), AuthError::MalformedResponse);
    }
}
