use crate::repository::{PasskeyApi, PasskeySummary};
use crate::session::{SessionManager, SessionStore};
use crate::AuthError;

/// Listing and removal of enrolled passkeys. Both operations go through
/// the session chokepoint and fail with
/// [`AuthError::Unauthenticated`] when no valid session exists.
pub struct PasskeyManagementAction<P: PasskeyApi, S: SessionStore> {
    api: P,
    sessions: SessionManager<S>,
}

impl<P: PasskeyApi, S: SessionStore> PasskeyManagementAction<P, S> {
    pub fn new(api: P, sessions: SessionManager<S>) -> Self {
        PasskeyManagementAction { api, sessions }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "passkey_list", skip_all, err)
    )]
    pub async fn list(&self) -> Result<Vec<PasskeySummary>, AuthError> {
        let Some(session) = self.sessions.get_session().await? else {
            return Err(AuthError::Unauthenticated);
        };

        self.api.list_passkeys(&session.access_token).await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "passkey_remove", skip_all, err)
    )]
    pub async fn remove(&self, passkey_id: &str) -> Result<(), AuthError> {
        let Some(session) = self.sessions.get_session().await? else {
            return Err(AuthError::Unauthenticated);
        };

        self.api
            .remove_passkey(&session.access_token, passkey_id)
            .await?;

        log::info!(target: "vestibule::auth", "msg=\"passkey removed\"");
        Ok(())
    }
}
