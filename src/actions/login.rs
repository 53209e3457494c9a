use chrono::Utc;

use crate::crypto::SecretString;
use crate::events::{dispatch, AuthEvent, AuthMethod};
use crate::repository::AuthApi;
use crate::resolver::{resolve, AuthOutcome};
use crate::session::{Session, SessionManager, SessionStore};
use crate::validators::{validate_email, ValidationError};
use crate::AuthError;

/// The state held between "password accepted, second factor required" and
/// the 2FA completion call.
///
/// Deliberately neither `Clone` nor `Copy`:
/// [`VerifyTotpAction`](super::VerifyTotpAction) consumes it by value, so
/// a challenge can be exchanged for a session exactly once.
#[derive(Debug)]
pub struct ChallengeState {
    pub(crate) challenge_token: SecretString,
    email: String,
}

impl ChallengeState {
    pub fn new(challenge_token: SecretString, email: impl Into<String>) -> Self {
        Self {
            challenge_token,
            email: email.into(),
        }
    }

    /// The email the challenge was issued for, for display in the 2FA
    /// prompt.
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Result of a password login attempt that was not rejected.
#[derive(Debug)]
pub enum LoginOutcome {
    SignedIn(Session),
    /// Step-up required; no session was created.
    ChallengeRequired(ChallengeState),
}

pub struct LoginAction<A: AuthApi, S: SessionStore> {
    api: A,
    sessions: SessionManager<S>,
}

impl<A: AuthApi, S: SessionStore> LoginAction<A, S> {
    pub fn new(api: A, sessions: SessionManager<S>) -> Self {
        LoginAction { api, sessions }
    }

    /// Submits password credentials.
    ///
    /// # Returns
    ///
    /// - `Ok(LoginOutcome::SignedIn)` - session created and persisted
    /// - `Ok(LoginOutcome::ChallengeRequired)` - hold the challenge for
    ///   the 2FA completion call; no session exists yet
    /// - `Err(AuthError::ProviderRejected)` - credentials rejected, the
    ///   provider's message passed through verbatim
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "login", skip_all, err)
    )]
    pub async fn execute(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(ValidationError::PasswordEmpty.into());
        }

        let response = self.api.login(email, password).await?;

        match resolve(&response)? {
            AuthOutcome::Authenticated {
                user: Some(user),
                grant,
            } => {
                let session = self.sessions.create_session(user, grant).await?;

                dispatch(AuthEvent::SignedIn {
                    user_id: session.user.id.clone(),
                    method: AuthMethod::Password,
                    at: Utc::now(),
                })
                .await;

                log::info!(target: "vestibule::auth", "msg=\"login success\"");
                Ok(LoginOutcome::SignedIn(session))
            }
            AuthOutcome::Authenticated { user: None, .. } => Err(AuthError::MalformedResponse),
            AuthOutcome::ChallengeRequired {
                challenge_token,
                email: hint,
            } => {
                dispatch(AuthEvent::ChallengeIssued {
                    email: email.to_owned(),
                    at: Utc::now(),
                })
                .await;

                log::info!(target: "vestibule::auth", "msg=\"login challenge issued\"");
                Ok(LoginOutcome::ChallengeRequired(ChallengeState::new(
                    challenge_token,
                    hint.unwrap_or_else(|| email.to_owned()),
                )))
            }
            AuthOutcome::Rejected { reason, code } => {
                log::info!(target: "vestibule::auth", "msg=\"login rejected\"");
                Err(AuthError::ProviderRejected {
                    message: reason,
                    code,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockAuthApi;
    use crate::session::InMemorySessionStore;
    use serde_json::json;

    fn action() -> (MockAuthApi, SessionManager<InMemorySessionStore>, LoginAction<MockAuthApi, InMemorySessionStore>) {
        let api = MockAuthApi::new();
        let sessions = SessionManager::new(InMemorySessionStore::new());
        let action = LoginAction::new(api.clone(), sessions.clone());
        (api, sessions, action)
    }

    fn future_millis(secs: i64) -> i64 {
        (Utc::now() + chrono::Duration::seconds(secs)).timestamp_millis()
    }

    #[tokio::test]
    async fn test_login_creates_session() {
        let (api, sessions, action) = action();
        api.push_json(json!({
            "token": "at",
            "refreshToken": "rt",
            "expiresAt": future_millis(3600),
            "user": {"id": "u1", "email": "user@example.com", "emailVerified": true},
        }));

        let outcome = action.execute("user@example.com", "hunter22").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::SignedIn(_)));

        let session = sessions.get_session().await.unwrap().unwrap();
        assert_eq!(session.user.id, "u1");
        assert_eq!(session.access_token, "at".into());
    }

    #[tokio::test]
    async fn test_login_challenge_creates_no_session() {
        let (api, sessions, action) = action();
        api.push_json(json!({"totpRequired": true, "challengeToken": "c1"}));

        let outcome = action.execute("user@example.com", "hunter22").await.unwrap();
        match outcome {
            LoginOutcome::ChallengeRequired(challenge) => {
                assert_eq!(challenge.email(), "user@example.com");
            }
            other => panic!("expected challenge, got {other:?}"),
        }

        assert!(sessions.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_rejected_passes_reason_through() {
        let (api, _sessions, action) = action();
        api.push_json(json!({"error": {"message": "invalid credentials", "code": "bad_login"}}));

        let err = action.execute("user@example.com", "wrong").await.unwrap_err();
        assert_eq!(
            err,
            AuthError::ProviderRejected {
                message: "invalid credentials".to_owned(),
                code: Some("bad_login".to_owned()),
            }
        );
    }

    #[tokio::test]
    async fn test_login_validates_before_network() {
        let (api, _sessions, action) = action();

        let err = action.execute("not-an-email", "hunter22").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let err = action.execute("user@example.com", "").await.unwrap_err();
        assert_eq!(err, AuthError::Validation(ValidationError::PasswordEmpty));

        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_login_transient_failure_surfaces() {
        let (api, _sessions, action) = action();
        api.push(Err(AuthError::TransientFailure("timeout".to_owned())));

        let err = action.execute("user@example.com", "hunter22").await.unwrap_err();
        assert!(matches!(err, AuthError::TransientFailure(_)));
    }
}
