//! Session lifecycle orchestration over a [`SessionStore`].

use chrono::{Duration, Utc};

use crate::config::AuthConfig;
use crate::AuthError;

use super::store::SessionStore;
use super::{Session, SessionUser, TokenGrant};

/// Creates, validates, updates, and clears the session record.
///
/// This is the only interface the rest of the application uses to touch
/// session state; nothing reads the underlying store directly. Reads fail
/// closed: a structurally broken or expired record is deleted and reported
/// as absent, never returned.
///
/// Construction is cheap (no I/O); share one instance by cloning when the
/// store is cloneable, or build one per call site.
#[derive(Clone)]
pub struct SessionManager<S: SessionStore> {
    store: S,
    refresh_threshold: Duration,
}

impl<S: SessionStore> SessionManager<S> {
    /// Creates a manager with the default refresh threshold.
    pub fn new(store: S) -> Self {
        Self::with_config(store, &AuthConfig::default())
    }

    /// Creates a manager with policy taken from `config`.
    pub fn with_config(store: S, config: &AuthConfig) -> Self {
        SessionManager {
            store,
            refresh_threshold: config.refresh.threshold,
        }
    }

    /// Loads the current session, deleting and reporting absent anything
    /// invalid or expired.
    pub async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(session) = self.store.load().await? else {
            return Ok(None);
        };

        if !session.is_complete() || session.is_expired(Utc::now()) {
            // fail closed: a record we cannot trust is removed, not returned
            if let Err(err) = self.store.delete().await {
                log::warn!(
                    target: "vestibule::session",
                    "msg=\"failed to delete invalid session\" error=\"{err}\""
                );
            }
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Persists a fresh session for `user`, stamping `issued_at` now.
    pub async fn create_session(
        &self,
        user: SessionUser,
        grant: TokenGrant,
    ) -> Result<Session, AuthError> {
        let session = Session {
            user,
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at: grant.expires_at,
            issued_at: Utc::now(),
        };

        if !session.is_complete() {
            return Err(AuthError::MalformedResponse);
        }

        self.store.save(&session).await?;
        Ok(session)
    }

    /// Replaces only the token fields of the current session, preserving
    /// `user` and `issued_at`.
    ///
    /// Errors with [`AuthError::NoActiveSession`] when there is no valid
    /// session to update.
    pub async fn update_tokens(&self, grant: TokenGrant) -> Result<Session, AuthError> {
        let Some(mut session) = self.get_session().await? else {
            return Err(AuthError::NoActiveSession);
        };

        session.access_token = grant.access_token;
        session.refresh_token = grant.refresh_token;
        session.expires_at = grant.expires_at;

        if !session.is_complete() {
            return Err(AuthError::MalformedResponse);
        }

        self.store.save(&session).await?;
        Ok(session)
    }

    /// Removes the session record. Idempotent.
    pub async fn clear_session(&self) -> Result<(), AuthError> {
        self.store.delete().await
    }

    /// The single chokepoint for protected operations: returns the signed-in
    /// user or [`AuthError::Unauthenticated`].
    pub async fn require_session(&self) -> Result<SessionUser, AuthError> {
        self.get_session()
            .await?
            .map(|session| session.user)
            .ok_or(AuthError::Unauthenticated)
    }

    /// True when a valid session exists.
    pub async fn is_authenticated(&self) -> bool {
        matches!(self.get_session().await, Ok(Some(_)))
    }

    /// True when the current session's token is inside the refresh margin.
    pub async fn should_refresh(&self) -> Result<bool, AuthError> {
        Ok(self.get_session().await?.is_some_and(|session| {
            crate::clock::should_refresh(session.expires_at, Utc::now(), self.refresh_threshold)
        }))
    }

    /// Whole seconds until the current session's token expires, or `None`
    /// when no session exists.
    pub async fn time_until_expiry(&self) -> Result<Option<i64>, AuthError> {
        Ok(self
            .get_session()
            .await?
            .map(|session| crate::clock::ttl_seconds(session.expires_at, Utc::now())))
    }
}
