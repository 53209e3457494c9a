use chrono::Utc;

use crate::ceremony::{CeremonyKind, CeremonyRegistry};
use crate::events::{dispatch, AuthEvent, AuthMethod};
use crate::repository::{CeremonyOffer, PasskeyApi};
use crate::resolver::{resolve, AuthOutcome};
use crate::session::{Session, SessionManager, SessionStore};
use crate::AuthError;

/// Passkey sign-in as a begin/finish ceremony pair.
///
/// `begin` fetches WebAuthn options and records the provider-issued
/// handle; `finish` requires-and-invalidates that handle before anything
/// goes over the wire, so a finish call can never complete a ceremony
/// that was not started here.
pub struct PasskeyLoginAction<P: PasskeyApi, S: SessionStore> {
    api: P,
    sessions: SessionManager<S>,
    ceremonies: CeremonyRegistry,
}

impl<P: PasskeyApi, S: SessionStore> PasskeyLoginAction<P, S> {
    pub fn new(api: P, sessions: SessionManager<S>, ceremonies: CeremonyRegistry) -> Self {
        PasskeyLoginAction {
            api,
            sessions,
            ceremonies,
        }
    }

    /// Starts the ceremony. Hand `offer.options` to the authenticator and
    /// keep `offer.ceremony_id` for the finish call.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "passkey_login_begin", skip_all, err)
    )]
    pub async fn begin(&self) -> Result<CeremonyOffer, AuthError> {
        let offer = self.api.login_begin().await?;
        self.ceremonies
            .register(&offer.ceremony_id, CeremonyKind::Login);

        log::debug!(target: "vestibule::auth", "msg=\"passkey login ceremony started\"");
        Ok(offer)
    }

    /// Completes the ceremony with the authenticator's credential.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "passkey_login_finish", skip_all, err)
    )]
    pub async fn finish(
        &self,
        ceremony_id: &str,
        credential: serde_json::Value,
    ) -> Result<Session, AuthError> {
        self.ceremonies.complete(ceremony_id, CeremonyKind::Login)?;

        let response = self.api.login_finish(ceremony_id, &credential).await?;

        match resolve(&response)? {
            AuthOutcome::Authenticated { user, grant } => {
                // finish responses carry tokens only; the identity
                // projection falls back to the token's own claims
                let user = match user {
                    Some(user) => user,
                    None => super::session_user_from_token(&grant.access_token)?,
                };

                let session = self.sessions.create_session(user, grant).await?;

                dispatch(AuthEvent::SignedIn {
                    user_id: session.user.id.clone(),
                    method: AuthMethod::Passkey,
                    at: Utc::now(),
                })
                .await;

                log::info!(target: "vestibule::auth", "msg=\"passkey login success\"");
                Ok(session)
            }
            AuthOutcome::ChallengeRequired { .. } => Err(AuthError::MalformedResponse),
            AuthOutcome::Rejected { reason, code } => {
                log::info!(target: "vestibule::auth", "msg=\"passkey login rejected\"");
                Err(AuthError::ProviderRejected {
                    message: reason,
                    code,
                })
            }
        }
    }

    /// Drops an in-flight ceremony, e.g. when the user dismisses the
    /// authenticator prompt.
    pub fn abandon(&self, ceremony_id: &str) {
        self.ceremonies.abandon(ceremony_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockPasskeyApi;
    use crate::session::InMemorySessionStore;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use serde_json::json;

    fn setup() -> (MockPasskeyApi, SessionManager<InMemorySessionStore>, PasskeyLoginAction<MockPasskeyApi, InMemorySessionStore>) {
        let api = MockPasskeyApi::new();
        let sessions = SessionManager::new(InMemorySessionStore::new());
        let action = PasskeyLoginAction::new(api.clone(), sessions.clone(), CeremonyRegistry::new());
        (api, sessions, action)
    }

    fn token_with_claims() -> String {
        let header = URL_SAFE_NO_PAD.encode(b"{\"alg\":\"none\"}");
        let payload = URL_SAFE_NO_PAD.encode(
            json!({"sub": "u1", "email": "user@example.com"}).to_string().as_bytes(),
        );
        format!("{header}.{payload}.sig")
    }

    #[tokio::test]
    async fn test_begin_then_finish_signs_in() {
        let (api, sessions, action) = setup();
        api.push_offer("ceremony-1");

        let expires = (Utc::now() + chrono::Duration::hours(1)).timestamp_millis();
        api.push_json(json!({
            "accessToken": token_with_claims(),
            "refreshToken": "rt",
            "expiresAt": expires,
        }));

        let offer = action.begin().await.unwrap();
        assert_eq!(offer.ceremony_id, "ceremony-1");

        let session = action
            .finish("ceremony-1", json!({"rawId": "cred"}))
            .await
            .unwrap();

        assert_eq!(session.user.id, "u1");
        assert_eq!(session.user.email, "user@example.com");
        assert!(sessions.get_session().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_finish_without_begin_is_mismatch() {
        let (api, _sessions, action) = setup();

        let err = action
            .finish("never-issued", json!({"rawId": "cred"}))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::CeremonyMismatch);
        // rejected before any network call
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_finish_handle_is_single_use() {
        let (api, _sessions, action) = setup();
        api.push_offer("ceremony-1");

        let expires = (Utc::now() + chrono::Duration::hours(1)).timestamp_millis();
        api.push_json(json!({
            "accessToken": token_with_claims(),
            "refreshToken": "rt",
            "expiresAt": expires,
        }));

        action.begin().await.unwrap();
        action
            .finish("ceremony-1", json!({"rawId": "cred"}))
            .await
            .unwrap();

        let err = action
            .finish("ceremony-1", json!({"rawId": "cred"}))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::CeremonyMismatch);
    }

    #[tokio::test]
    async fn test_finish_rejected_by_provider() {
        let (api, sessions, action) = setup();
        api.push_offer("ceremony-1");
        api.push_json(json!({"error": "credential not recognized"}));

        action.begin().await.unwrap();
        let err = action
            .finish("ceremony-1", json!({"rawId": "cred"}))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::rejected("credential not recognized"));
        assert!(sessions.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_finish_with_undecodable_token_fails_closed() {
        let (api, sessions, action) = setup();
        api.push_offer("ceremony-1");

        let expires = (Utc::now() + chrono::Duration::hours(1)).timestamp_millis();
        api.push_json(json!({
            "accessToken": "not-a-compact-token",
            "refreshToken": "rt",
            "expiresAt": expires,
        }));

        action.begin().await.unwrap();
        let err = action
            .finish("ceremony-1", json!({"rawId": "cred"}))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::MalformedResponse);
        assert!(sessions.get_session().await.unwrap().is_none());
    }
}
