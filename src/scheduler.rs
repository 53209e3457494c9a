//! Background token renewal.
//!
//! A cooperative timer loop polls the current session and, when the
//! access token is inside the refresh margin, runs the refresh use-case.
//! An atomic in-flight flag guarantees at most one refresh RPC is
//! outstanding per scheduler: a tick (or a user-triggered
//! [`force_refresh`](RefreshScheduler::force_refresh)) that fires while
//! one is pending is dropped, not queued.
//!
//! The loop is cancellable through a [`CancellationToken`], independent of
//! any rendering framework; page or component teardown cancels the token
//! and the loop exits at the next select point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio_util::sync::CancellationToken;

use crate::actions::RefreshTokenAction;
use crate::clock;
use crate::config::AuthConfig;
use crate::events::{dispatch, AuthEvent};
use crate::repository::TokenApi;
use crate::session::{SessionManager, SessionStore};
use crate::AuthError;

/// Poll interval while no session exists.
const IDLE_POLL: std::time::Duration = std::time::Duration::from_secs(60);

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No session, or the token is not yet inside the refresh margin.
    Idle,
    /// Another refresh was already in flight; this trigger was dropped.
    Skipped,
    /// Tokens were renewed and merged into the session.
    Refreshed,
    /// The provider rejected the refresh; the session was cleared and
    /// [`AuthEvent::SessionInvalidated`] dispatched.
    SessionCleared,
    /// Transient trouble; the session is kept for the next tick.
    RetryLater,
}

pub struct RefreshScheduler<T: TokenApi, S: SessionStore> {
    action: RefreshTokenAction<T>,
    sessions: SessionManager<S>,
    refresh_threshold: Duration,
    in_flight: AtomicBool,
    shutdown: CancellationToken,
}

impl<T: TokenApi, S: SessionStore> RefreshScheduler<T, S> {
    pub fn new(api: T, sessions: SessionManager<S>) -> Self {
        Self::with_config(api, sessions, &AuthConfig::default())
    }

    pub fn with_config(api: T, sessions: SessionManager<S>, config: &AuthConfig) -> Self {
        RefreshScheduler {
            action: RefreshTokenAction::new(api),
            sessions,
            refresh_threshold: config.refresh.threshold,
            in_flight: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        }
    }

    /// Token the owner cancels to stop [`run`](Self::run), e.g. on page
    /// teardown.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// One pass of the loop: refresh if a session is inside the margin.
    pub async fn tick(&self) -> TickOutcome {
        self.refresh_inner(false).await
    }

    /// User-triggered refresh, regardless of the margin. Shares the
    /// in-flight guard with the background tick, so it cannot race it.
    pub async fn force_refresh(&self) -> TickOutcome {
        self.refresh_inner(true).await
    }

    async fn refresh_inner(&self, force: bool) -> TickOutcome {
        let session = match self.sessions.get_session().await {
            Ok(Some(session)) => session,
            Ok(None) => return TickOutcome::Idle,
            Err(err) => {
                log::warn!(
                    target: "vestibule::scheduler",
                    "msg=\"session read failed\" error=\"{err}\""
                );
                return TickOutcome::RetryLater;
            }
        };

        if !force && !clock::should_refresh(session.expires_at, Utc::now(), self.refresh_threshold)
        {
            return TickOutcome::Idle;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!(target: "vestibule::scheduler", "msg=\"refresh already in flight\"");
            return TickOutcome::Skipped;
        }

        let outcome = match self.action.execute(&session.refresh_token).await {
            Ok(grant) => match self.sessions.update_tokens(grant).await {
                Ok(updated) => {
                    dispatch(AuthEvent::SessionRefreshed {
                        expires_at: updated.expires_at,
                        at: Utc::now(),
                    })
                    .await;
                    TickOutcome::Refreshed
                }
                Err(err) => {
                    log::warn!(
                        target: "vestibule::scheduler",
                        "msg=\"refreshed tokens could not be stored\" error=\"{err}\""
                    );
                    TickOutcome::RetryLater
                }
            },
            Err(AuthError::SessionExpired) => {
                if let Err(err) = self.sessions.clear_session().await {
                    log::warn!(
                        target: "vestibule::scheduler",
                        "msg=\"session clear failed\" error=\"{err}\""
                    );
                }

                dispatch(AuthEvent::SessionInvalidated {
                    reason: "refresh rejected".to_owned(),
                    at: Utc::now(),
                })
                .await;

                log::info!(target: "vestibule::scheduler", "msg=\"session invalidated\"");
                TickOutcome::SessionCleared
            }
            Err(err) => {
                log::warn!(
                    target: "vestibule::scheduler",
                    "msg=\"refresh attempt failed, will retry\" error=\"{err}\""
                );
                TickOutcome::RetryLater
            }
        };

        self.in_flight.store(false, Ordering::Release);
        outcome
    }

    /// Runs the loop until the shutdown token is cancelled.
    pub async fn run(&self) {
        loop {
            self.tick().await;

            let interval = self.poll_interval().await;
            tokio::select! {
                () = self.shutdown.cancelled() => break,
                () = tokio::time::sleep(interval) => {}
            }
        }

        log::debug!(target: "vestibule::scheduler", "msg=\"refresh loop stopped\"");
    }

    async fn poll_interval(&self) -> std::time::Duration {
        match self.sessions.get_session().await {
            Ok(Some(session)) => {
                // floor of one second so an expiry-edge session cannot
                // turn the loop hot
                clock::next_poll_interval(session.expires_at, Utc::now())
                    .max(std::time::Duration::from_secs(1))
            }
            _ => IDLE_POLL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockTokenApi;
    use crate::session::{InMemorySessionStore, SessionUser, TokenGrant};
    use serde_json::json;

    fn test_user() -> SessionUser {
        SessionUser {
            id: "u1".to_owned(),
            email: "user@example.com".to_owned(),
            display_name: None,
            role: None,
            email_verified: true,
        }
    }

    async fn sessions_with_expiry(expires_in: Duration) -> SessionManager<InMemorySessionStore> {
        let sessions = SessionManager::new(InMemorySessionStore::new());
        sessions
            .create_session(
                test_user(),
                TokenGrant {
                    access_token: "at1".into(),
                    refresh_token: "rt1".into(),
                    expires_at: Utc::now() + expires_in,
                },
            )
            .await
            .unwrap();
        sessions
    }

    fn grant_json(expires_in_secs: i64) -> serde_json::Value {
        json!({
            "access_token": "at2",
            "refresh_token": "rt2",
            "expires_at": (Utc::now() + Duration::seconds(expires_in_secs)).timestamp_millis(),
        })
    }

    #[tokio::test]
    async fn test_tick_without_session_is_idle() {
        let api = MockTokenApi::new();
        let sessions = SessionManager::new(InMemorySessionStore::new());
        let scheduler = RefreshScheduler::new(api.clone(), sessions);

        assert_eq!(scheduler.tick().await, TickOutcome::Idle);
        assert_eq!(api.refresh_call_count(), 0);
    }

    #[tokio::test]
    async fn test_tick_far_from_expiry_is_idle() {
        let api = MockTokenApi::new();
        let sessions = sessions_with_expiry(Duration::hours(2)).await;
        let scheduler = RefreshScheduler::new(api.clone(), sessions);

        assert_eq!(scheduler.tick().await, TickOutcome::Idle);
        assert_eq!(api.refresh_call_count(), 0);
    }

    #[tokio::test]
    async fn test_tick_near_expiry_refreshes() {
        let api = MockTokenApi::new();
        api.push_json(grant_json(3600));
        let sessions = sessions_with_expiry(Duration::seconds(60)).await;
        let scheduler = RefreshScheduler::new(api.clone(), sessions.clone());

        assert_eq!(scheduler.tick().await, TickOutcome::Refreshed);
        assert_eq!(api.refresh_call_count(), 1);

        let session = sessions.get_session().await.unwrap().unwrap();
        assert_eq!(session.access_token, "at2".into());
        assert_eq!(session.refresh_token, "rt2".into());
        // identity survived the rotation
        assert_eq!(session.user, test_user());
    }

    #[tokio::test]
    async fn test_concurrent_ticks_make_one_call() {
        let api = MockTokenApi::new();
        let gate = api.hold();
        api.push_json(grant_json(3600));

        let sessions = sessions_with_expiry(Duration::seconds(60)).await;
        let scheduler = Arc::new(RefreshScheduler::new(api.clone(), sessions));

        let first = tokio::spawn({
            let scheduler = scheduler.clone();
            async move { scheduler.tick().await }
        });

        // let the first tick reach the gated repository call
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(scheduler.tick().await, TickOutcome::Skipped);

        gate.notify_one();
        assert_eq!(first.await.unwrap(), TickOutcome::Refreshed);
        assert_eq!(api.refresh_call_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_refresh_clears_session() {
        let api = MockTokenApi::new();
        api.push_json(json!({"error": {"message": "invalid grant", "code": "invalid_grant"}}));

        let sessions = sessions_with_expiry(Duration::seconds(60)).await;
        let scheduler = RefreshScheduler::new(api, sessions.clone());

        assert_eq!(scheduler.tick().await, TickOutcome::SessionCleared);
        assert!(sessions.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transient_failure_keeps_session() {
        let api = MockTokenApi::new();
        api.push(Err(AuthError::TransientFailure("timeout".to_owned())));

        let sessions = sessions_with_expiry(Duration::seconds(60)).await;
        let scheduler = RefreshScheduler::new(api.clone(), sessions.clone());

        assert_eq!(scheduler.tick().await, TickOutcome::RetryLater);
        assert!(sessions.get_session().await.unwrap().is_some());

        // next tick retries
        api.push_json(grant_json(3600));
        assert_eq!(scheduler.tick().await, TickOutcome::Refreshed);
    }

    #[tokio::test]
    async fn test_force_refresh_ignores_margin() {
        let api = MockTokenApi::new();
        api.push_json(grant_json(7200));

        let sessions = sessions_with_expiry(Duration::hours(2)).await;
        let scheduler = RefreshScheduler::new(api.clone(), sessions);

        assert_eq!(scheduler.force_refresh().await, TickOutcome::Refreshed);
        assert_eq!(api.refresh_call_count(), 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancellation() {
        let api = MockTokenApi::new();
        let sessions = SessionManager::new(InMemorySessionStore::new());
        let scheduler = Arc::new(RefreshScheduler::new(api, sessions));

        let token = scheduler.shutdown_token();
        let handle = tokio::spawn({
            let scheduler = scheduler.clone();
            async move { scheduler.run().await }
        });

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        token.cancel();
        handle.await.unwrap();
    }
}
