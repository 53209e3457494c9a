use chrono::Utc;

use crate::config::AuthConfig;
use crate::crypto::SecretString;
use crate::events::{dispatch, AuthEvent, AuthMethod};
use crate::repository::AccountApi;
use crate::resolver::{resolve, AuthOutcome};
use crate::session::{Session, SessionManager, SessionStore};
use crate::validators::{validate_password, ValidationError};
use crate::AuthError;

/// Completes a password reset with the token from the reset email.
pub struct ResetPasswordAction<A: AccountApi, S: SessionStore> {
    api: A,
    sessions: SessionManager<S>,
    min_password_length: usize,
}

impl<A: AccountApi, S: SessionStore> ResetPasswordAction<A, S> {
    pub fn new(api: A, sessions: SessionManager<S>) -> Self {
        Self::with_config(api, sessions, &AuthConfig::default())
    }

    pub fn with_config(api: A, sessions: SessionManager<S>, config: &AuthConfig) -> Self {
        ResetPasswordAction {
            api,
            sessions,
            min_password_length: config.passwords.min_length,
        }
    }

    /// # Returns
    ///
    /// - `Ok(Some(session))` - reset accepted and the provider signed the
    ///   user straight in
    /// - `Ok(None)` - reset accepted with an acknowledgement-only body
    /// - `Err(AuthError::ProviderRejected)` - bad or expired reset token
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "reset_password", skip_all, err)
    )]
    pub async fn execute(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<Option<Session>, AuthError> {
        if token.is_empty() {
            return Err(ValidationError::TokenMissing.into());
        }
        validate_password(new_password, self.min_password_length)?;

        let response = self
            .api
            .reset_password(token, &SecretString::new(new_password))
            .await?;

        match resolve(&response) {
            Ok(AuthOutcome::Authenticated {
                user: Some(user),
                grant,
            }) => {
                let session = self.sessions.create_session(user, grant).await?;

                dispatch(AuthEvent::SignedIn {
                    user_id: session.user.id.clone(),
                    method: AuthMethod::PasswordReset,
                    at: Utc::now(),
                })
                .await;

                log::info!(target: "vestibule::auth", "msg=\"password reset signed in\"");
                Ok(Some(session))
            }
            Ok(AuthOutcome::Authenticated { user: None, .. })
            | Ok(AuthOutcome::ChallengeRequired { .. }) => Err(AuthError::MalformedResponse),
            Ok(AuthOutcome::Rejected { reason, code }) => {
                log::info!(target: "vestibule::auth", "msg=\"password reset rejected\"");
                Err(AuthError::ProviderRejected {
                    message: reason,
                    code,
                })
            }
            // acknowledgement body: reset accepted, sign in separately
            Err(AuthError::MalformedResponse) => {
                log::info!(target: "vestibule::auth", "msg=\"password reset complete\"");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
