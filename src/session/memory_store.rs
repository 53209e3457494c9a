//! In-memory session storage.
//!
//! Suitable for development, testing, and single-process deployments.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::AuthError;

use super::store::SessionStore;
use super::Session;

/// Holds the single session record behind an `RwLock`.
///
/// # Note
///
/// The record is lost when the process exits. Production deployments back
/// the store with a sealed cookie instead (see
/// [`seal_session`](super::seal_session)).
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    record: Arc<RwLock<Option<Session>>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, session: &Session) -> Result<(), AuthError> {
        *self
            .record
            .write()
            .map_err(|_| AuthError::StorageError("lock poisoned".to_owned()))? =
            Some(session.clone());

        Ok(())
    }

    async fn load(&self) -> Result<Option<Session>, AuthError> {
        Ok(self
            .record
            .read()
            .map_err(|_| AuthError::StorageError("lock poisoned".to_owned()))?
            .clone())
    }

    async fn delete(&self) -> Result<(), AuthError> {
        *self
            .record
            .write()
            .map_err(|_| AuthError::StorageError("lock poisoned".to_owned()))? = None;

        Ok(())
    }
}
