use chrono::Utc;

use crate::events::{dispatch, AuthEvent, AuthMethod};
use crate::repository::AuthApi;
use crate::resolver::{resolve, AuthOutcome};
use crate::session::{Session, SessionManager, SessionStore};
use crate::validators::{validate_one_time_code, ValidationError};
use crate::AuthError;

use super::login::ChallengeState;

pub struct VerifyTotpAction<A: AuthApi, S: SessionStore> {
    api: A,
    sessions: SessionManager<S>,
}

impl<A: AuthApi, S: SessionStore> VerifyTotpAction<A, S> {
    pub fn new(api: A, sessions: SessionManager<S>) -> Self {
        VerifyTotpAction { api, sessions }
    }

    /// Exchanges a pending challenge and one-time code for a session.
    ///
    /// Takes the challenge by value: success or failure, it is gone and
    /// cannot be replayed. A rejection does not say whether the code or
    /// the challenge token was the problem; the provider's message passes
    /// through as-is.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "verify_totp", skip_all, err)
    )]
    pub async fn execute(
        &self,
        challenge: ChallengeState,
        code: &str,
    ) -> Result<Session, AuthError> {
        if challenge.challenge_token.is_empty() {
            return Err(ValidationError::ChallengeMissing.into());
        }
        validate_one_time_code(code)?;

        let response = self.api.verify_totp(&challenge.challenge_token, code).await?;

        match resolve(&response)? {
            AuthOutcome::Authenticated {
                user: Some(user),
                grant,
            } => {
                let session = self.sessions.create_session(user, grant).await?;

                dispatch(AuthEvent::SignedIn {
                    user_id: session.user.id.clone(),
                    method: AuthMethod::Totp,
                    at: Utc::now(),
                })
                .await;

                log::info!(target: "vestibule::auth", "msg=\"2fa verify success\"");
                Ok(session)
            }
            AuthOutcome::Authenticated { user: None, .. }
            | AuthOutcome::ChallengeRequired { .. } => Err(AuthError::MalformedResponse),
            AuthOutcome::Rejected { reason, code } => {
                log::info!(target: "vestibule::auth", "msg=\"2fa verify rejected\"");
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
    use crate::crypto::SecretString;
    use crate::repository::MockAuthApi;
    use crate::session::InMemorySessionStore;
    use serde_json::json;

    fn setup() -> (MockAuthApi, SessionManager<InMemorySessionStore>, VerifyTotpAction<MockAuthApi, InMemorySessionStore>) {
        let api = MockAuthApi::new();
        let sessions = SessionManager::new(InMemorySessionStore::new());
        let action = VerifyTotpAction::new(api.clone(), sessions.clone());
        (api, sessions, action)
    }

    fn challenge() -> ChallengeState {
        ChallengeState::new(SecretString::new("c1"), "user@example.com")
    }

    fn future_millis(secs: i64) -> i64 {
        (Utc::now() + chrono::Duration::seconds(secs)).timestamp_millis()
    }

    #[tokio::test]
    async fn test_verify_creates_session() {
        let (api, sessions, action) = setup();
        api.push_json(json!({
            "token": "at",
            "refreshToken": "rt",
            "expiresAt": future_millis(3600),
            "user": {"id": "u1", "email": "user@example.com"},
        }));

        let session = action.execute(challenge(), "123456").await.unwrap();
        assert_eq!(session.access_token, "at".into());
        assert!(sessions.get_session().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_verify_rejected() {
        let (api, sessions, action) = setup();
        api.push_json(json!({"error": "verification failed"}));

        let err = action.execute(challenge(), "123456").await.unwrap_err();
        assert_eq!(err, AuthError::rejected("verification failed"));
        assert!(sessions.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_challenge_is_caller_error() {
        let (api, _sessions, action) = setup();

        let empty = ChallengeState::new(SecretString::new(""), "user@example.com");
        let err = action.execute(empty, "123456").await.unwrap_err();

        assert_eq!(err, AuthError::Validation(ValidationError::ChallengeMissing));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_bad_code_format_rejected_locally() {
        let (api, _sessions, action) = setup();

        let err = action.execute(challenge(), "12ab56").await.unwrap_err();
        assert_eq!(err, AuthError::Validation(ValidationError::CodeInvalidFormat));
        assert_eq!(api.call_count(), 0);
    }
}
