use chrono::Utc;

use crate::events::{dispatch, AuthEvent, AuthMethod};
use crate::repository::AccountApi;
use crate::resolver::{resolve, AuthOutcome};
use crate::session::{Session, SessionManager, SessionStore};
use crate::validators::{validate_email, validate_one_time_code};
use crate::AuthError;

/// Completes passwordless login by exchanging the emailed code for a
/// session.
pub struct VerifyLoginCodeAction<A: AccountApi, S: SessionStore> {
    api: A,
    sessions: SessionManager<S>,
}

impl<A: AccountApi, S: SessionStore> VerifyLoginCodeAction<A, S> {
    pub fn new(api: A, sessions: SessionManager<S>) -> Self {
        VerifyLoginCodeAction { api, sessions }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "verify_login_code", skip_all, err)
    )]
    pub async fn execute(&self, email: &str, code: &str) -> Result<Session, AuthError> {
        validate_email(email)?;
        validate_one_time_code(code)?;

        let response = self.api.verify_login_code(email, code).await?;

        match resolve(&response)? {
            AuthOutcome::Authenticated {
                user: Some(user),
                grant,
            } => {
                let session = self.sessions.create_session(user, grant).await?;

                dispatch(AuthEvent::SignedIn {
                    user_id: session.user.id.clone(),
                    method: AuthMethod::LoginCode,
                    at: Utc::now(),
                })
                .await;

                log::info!(target: "vestibule::auth", "msg=\"login code verify success\"");
                Ok(session)
            }
            AuthOutcome::Authenticated { user: None, .. }
            | AuthOutcome::ChallengeRequired { .. } => Err(AuthError::MalformedResponse),
            AuthOutcome::Rejected { reason, code } => {
                log::info!(target: "vestibule::auth", "msg=\"login code verify rejected\"");
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
    use crate::repository::MockAccountApi;
    use crate::session::InMemorySessionStore;
    use crate::validators::ValidationError;
    use serde_json::json;

    #[tokio::test]
    async fn test_code_exchange_creates_session() {
        let api = MockAccountApi::new();
        let sessions = SessionManager::new(InMemorySessionStore::new());
        let expires = (Utc::now() + chrono::Duration::hours(1)).timestamp_millis();
        api.push_json(json!({
            "token": "at",
            "refreshToken": "rt",
            "expiresAt": expires,
            "user": {"id": "u1", "email": "user@example.com"},
        }));

        let action = VerifyLoginCodeAction::new(api, sessions.clone());
        let session = action.execute("user@example.com", "123456").await.unwrap();

        assert_eq!(session.user.id, "u1");
        assert!(sessions.get_session().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_wrong_code_rejected_without_detail_leak() {
        let api = MockAccountApi::new();
        let sessions = SessionManager::new(InMemorySessionStore::new());
        api.push_json(json!({"error": "verification failed"}));

        let action = VerifyLoginCodeAction::new(api, sessions.clone());
        let err = action.execute("user@example.com", "123456").await.unwrap_err();

        assert_eq!(err, AuthError::rejected("verification failed"));
        assert!(sessions.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_code_format_checked_locally() {
        let api = MockAccountApi::new();
        let sessions = SessionManager::new(InMemorySessionStore::new());
        let action = VerifyLoginCodeAction::new(api.clone(), sessions);

        let err = action.execute("user@example.com", "abc").await.unwrap_err();
        assert_eq!(err, AuthError::Validation(ValidationError::CodeInvalidFormat));
        assert_eq!(api.call_count(), 0);
    }
}
