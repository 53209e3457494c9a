use chrono::Utc;

use crate::ceremony::{CeremonyKind, CeremonyRegistry};
use crate::events::{dispatch, AuthEvent, AuthMethod};
use crate::repository::{CeremonyOffer, PasskeyApi};
use crate::resolver::{resolve, AuthOutcome};
use crate::session::{Session, SessionManager, SessionStore};
use crate::AuthError;

/// Passkey enrollment as a begin/finish ceremony pair.
///
/// `begin` requires a signed-in user (enrollment attaches a credential to
/// the current account). On finish, a token triple from the provider
/// extends the current session; an acknowledgement-only body leaves it
/// untouched.
pub struct PasskeyRegistrationAction<P: PasskeyApi, S: SessionStore> {
    api: P,
    sessions: SessionManager<S>,
    ceremonies: CeremonyRegistry,
}

impl<P: PasskeyApi, S: SessionStore> PasskeyRegistrationAction<P, S> {
    pub fn new(api: P, sessions: SessionManager<S>, ceremonies: CeremonyRegistry) -> Self {
        PasskeyRegistrationAction {
            api,
            sessions,
            ceremonies,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "passkey_register_begin", skip_all, err)
    )]
    pub async fn begin(&self) -> Result<CeremonyOffer, AuthError> {
        let Some(session) = self.sessions.get_session().await? else {
            return Err(AuthError::Unauthenticated);
        };

        let offer = self.api.register_begin(&session.access_token).await?;
        self.ceremonies
            .register(&offer.ceremony_id, CeremonyKind::Registration);

        log::debug!(target: "vestibule::auth", "msg=\"passkey registration ceremony started\"");
        Ok(offer)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "passkey_register_finish", skip_all, err)
    )]
    pub async fn finish(
        &self,
        ceremony_id: &str,
        credential: serde_json::Value,
    ) -> Result<Session, AuthError> {
        self.ceremonies
            .complete(ceremony_id, CeremonyKind::Registration)?;

        let response = self.api.register_finish(ceremony_id, &credential).await?;

        match resolve(&response) {
            Ok(AuthOutcome::Authenticated { user: _, grant }) => {
                let session = self.sessions.update_tokens(grant).await?;

                dispatch(AuthEvent::SessionRefreshed {
                    expires_at: session.expires_at,
                    at: Utc::now(),
                })
                .await;

                log::info!(target: "vestibule::auth", "msg=\"passkey registered, tokens rotated\"");
                Ok(session)
            }
            Ok(AuthOutcome::ChallengeRequired { .. }) => Err(AuthError::MalformedResponse),
            Ok(AuthOutcome::Rejected { reason, code }) => {
                log::info!(target: "vestibule::auth", "msg=\"passkey registration rejected\"");
                Err(AuthError::ProviderRejected {
                    message: reason,
                    code,
                })
            }
            // acknowledgement body: enrolled without a token rotation
            Err(AuthError::MalformedResponse) => {
                log::info!(target: "vestibule::auth", "msg=\"passkey registered\"");
                self.sessions
                    .get_session()
                    .await?
                    .ok_or(AuthError::Unauthenticated)
            }
            Err(err) => Err(err),
        }
    }

    pub fn abandon(&self, ceremony_id: &str) {
        self.ceremonies.abandon(ceremony_id);
    }
}
