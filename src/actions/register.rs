use chrono::Utc;

use crate::config::AuthConfig;
use crate::events::{dispatch, AuthEvent, AuthMethod};
use crate::repository::{AccountApi, NewAccount};
use crate::resolver::{resolve, AuthOutcome};
use crate::session::{Session, SessionManager, SessionStore};
use crate::validators::{validate_email, validate_password};
use crate::AuthError;

/// Result of a successful registration call.
#[derive(Debug)]
pub enum RegisterOutcome {
    /// The provider issued tokens immediately.
    SignedIn(Session),
    /// The account was created but must verify its email before tokens
    /// are issued.
    VerificationPending,
}

pub struct RegisterAction<A: AccountApi, S: SessionStore> {
    api: A,
    sessions: SessionManager<S>,
    min_password_length: usize,
}

impl<A: AccountApi, S: SessionStore> RegisterAction<A, S> {
    pub fn new(api: A, sessions: SessionManager<S>) -> Self {
        Self::with_config(api, sessions, &AuthConfig::default())
    }

    pub fn with_config(api: A, sessions: SessionManager<S>, config: &AuthConfig) -> Self {
        RegisterAction {
            api,
            sessions,
            min_password_length: config.passwords.min_length,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "register", skip_all, err)
    )]
    pub async fn execute(&self, account: NewAccount) -> Result<RegisterOutcome, AuthError> {
        validate_email(&account.email)?;
        validate_password(account.password.expose_secret(), self.min_password_length)?;

        let response = self.api.register(&account).await?;

        match resolve(&response) {
            Ok(AuthOutcome::Authenticated {
                user: Some(user),
                grant,
            }) => {
                let session = self.sessions.create_session(user, grant).await?;

                dispatch(AuthEvent::RegistrationSubmitted {
                    email: account.email.clone(),
                    at: Utc::now(),
                })
                .await;
                dispatch(AuthEvent::SignedIn {
                    user_id: session.user.id.clone(),
                    method: AuthMethod::Password,
                    at: Utc::now(),
                })
                .await;

                log::info!(target: "vestibule::auth", "msg=\"registration signed in\"");
                Ok(RegisterOutcome::SignedIn(session))
            }
            Ok(AuthOutcome::Authenticated { user: None, .. })
            | Ok(AuthOutcome::ChallengeRequired { .. }) => Err(AuthError::MalformedResponse),
            Ok(AuthOutcome::Rejected { reason, code }) => {
                log::info!(target: "vestibule::auth", "msg=\"registration rejected\"");
                Err(AuthError::ProviderRejected {
                    message: reason,
                    code,
                })
            }
            // account created, tokens withheld until email verification
            Err(AuthError::MalformedResponse) if response.user.is_some() => {
                dispatch(AuthEvent::RegistrationSubmitted {
                    email: account.email.clone(),
                    at: Utc::now(),
                })
                .await;

                log::info!(target: "vestibule::auth", "msg=\"registration pending verification\"");
                Ok(RegisterOutcome::VerificationPending)
            }
            Err(err) => Err(err),
        }
    }
}
