use chrono::Utc;

use crate::events::{dispatch, AuthEvent};
use crate::repository::TokenApi;
use crate::session::{SessionManager, SessionStore};

/// Signs the user out.
///
/// Infallible from the caller's perspective: revocation and store errors
/// are logged and swallowed, and the caller proceeds to the signed-out
/// state regardless. A user must never be stuck unable to sign out.
pub struct LogoutAction<T: TokenApi, S: SessionStore> {
    api: T,
    sessions: SessionManager<S>,
}

impl<T: TokenApi, S: SessionStore> LogoutAction<T, S> {
    pub fn new(api: T, sessions: SessionManager<S>) -> Self {
        LogoutAction { api, sessions }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(name = "logout", skip_all))]
    pub async fn execute(&self) {
        // best-effort server-side revocation
        match self.sessions.get_session().await {
            Ok(Some(session)) => {
                if let Err(err) = self.api.revoke(&session.refresh_token).await {
                    log::warn!(
                        target: "vestibule::auth",
                        "msg=\"token revocation failed during logout\" error=\"{err}\""
                    );
                }
            }
            Ok(None) => {}
            Err(err) => {
                log::warn!(
                    target: "vestibule::auth",
                    "msg=\"session read failed during logout\" error=\"{err}\""
                );
            }
        }

        if let Err(err) = self.sessions.clear_session().await {
            log::warn!(
                target: "vestibule::auth",
                "msg=\"session clear failed during logout\" error=\"{err}\""
            );
        }

        dispatch(AuthEvent::SignedOut { at: Utc::now() }).await;
        log::info!(target: "vestibule::auth", "msg=\"logout success\"");
    }
}
