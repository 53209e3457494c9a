use chrono::Utc;

use crate::events::{dispatch, AuthEvent, AuthMethod};
use crate::repository::AccountApi;
use crate::resolver::{resolve, AuthOutcome};
use crate::session::{Session, SessionManager, SessionStore};
use crate::validators::ValidationError;
use crate::AuthError;

pub struct VerifyEmailAction<A: AccountApi, S: SessionStore> {
    api: A,
    sessions: SessionManager<S>,
}

impl<A: AccountApi, S: SessionStore> VerifyEmailAction<A, S> {
    pub fn new(api: A, sessions: SessionManager<S>) -> Self {
        VerifyEmailAction { api, sessions }
    }

    /// Confirms an emailed verification token.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(session))` - verified, and the provider issued tokens
    /// - `Ok(None)` - verified with an acknowledgement-only body
    /// - `Err(AuthError::ProviderRejected)` - bad or expired token
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "verify_email", skip_all, err)
    )]
    pub async fn execute(&self, token: &str) -> Result<Option<Session>, AuthError> {
        if token.is_empty() {
            return Err(ValidationError::TokenMissing.into());
        }

        let response = self.api.verify_email(token).await?;

        match resolve(&response) {
            Ok(AuthOutcome::Authenticated {
                user: Some(user),
                grant,
            }) => {
                let session = self.sessions.create_session(user, grant).await?;

                dispatch(AuthEvent::EmailVerified { at: Utc::now() }).await;
                dispatch(AuthEvent::SignedIn {
                    user_id: session.user.id.clone(),
                    method: AuthMethod::EmailVerification,
                    at: Utc::now(),
                })
                .await;

                log::info!(target: "vestibule::auth", "msg=\"email verified, signed in\"");
                Ok(Some(session))
            }
            Ok(AuthOutcome::Authenticated { user: None, .. })
            | Ok(AuthOutcome::ChallengeRequired { .. }) => Err(AuthError::MalformedResponse),
            Ok(AuthOutcome::Rejected { reason, code }) => Err(AuthError::ProviderRejected {
                message: reason,
                code,
            }),
            // acknowledgement body: verified, no tokens issued
            Err(AuthError::MalformedResponse) => {
                dispatch(AuthEvent::EmailVerified { at: Utc::now() }).await;
                log::info!(target: "vestibule::auth", "msg=\"email verified\"");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
