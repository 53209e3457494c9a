//! Correlation of passkey begin/finish call pairs.
//!
//! A WebAuthn ceremony spans two provider calls. The provider issues a
//! handle at `begin`; this registry records it and requires-and-invalidates
//! it at `finish`, so a finish call can never ride on a handle that was
//! not issued, was already used, belongs to the other ceremony kind, or
//! has sat around past its TTL.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use crate::config::AuthConfig;
use crate::AuthError;

/// Which half of the passkey surface a handle belongs to. A login handle
/// cannot finish a registration or vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeremonyKind {
    Login,
    Registration,
}

#[derive(Debug, Clone)]
struct Entry {
    kind: CeremonyKind,
    issued_at: DateTime<Utc>,
}

/// Arena of in-flight ceremony handles.
///
/// Cloning shares the underlying arena, so the begin and finish actions
/// can hold the same registry.
#[derive(Clone)]
pub struct CeremonyRegistry {
    inflight: Arc<Mutex<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl Default for CeremonyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CeremonyRegistry {
    /// Creates a registry with the default handle TTL.
    pub fn new() -> Self {
        Self::with_config(&AuthConfig::default())
    }

    pub fn with_config(config: &AuthConfig) -> Self {
        Self {
            inflight: Arc::new(Mutex::new(HashMap::new())),
            ttl: config.ceremonies.ttl,
        }
    }

    /// Records a provider-issued handle at ceremony begin.
    pub fn register(&self, ceremony_id: &str, kind: CeremonyKind) {
        let entry = Entry {
            kind,
            issued_at: Utc::now(),
        };
        self.lock().insert(ceremony_id.to_owned(), entry);
    }

    /// Consumes a handle at ceremony finish.
    ///
    /// The handle is removed whether or not it is accepted; a second
    /// finish with the same handle always fails.
    pub fn complete(&self, ceremony_id: &str, kind: CeremonyKind) -> Result<(), AuthError> {
        self.complete_at(ceremony_id, kind, Utc::now())
    }

    fn complete_at(
        &self,
        ceremony_id: &str,
        kind: CeremonyKind,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let entry = self.lock().remove(ceremony_id);

        match entry {
            Some(entry) if entry.kind == kind && now - entry.issued_at <= self.ttl => Ok(()),
            _ => Err(AuthError::CeremonyMismatch),
        }
    }

    /// Drops a handle without finishing, e.g. when the user dismisses the
    /// authenticator prompt.
    pub fn abandon(&self, ceremony_id: &str) {
        self.lock().remove(ceremony_id);
    }

    /// Removes handles past their TTL. Returns the number pruned.
    pub fn prune_expired(&self) -> usize {
        let now = Utc::now();
        let ttl = self.ttl;
        let mut inflight = self.lock();
        let before = inflight.len();
        inflight.retain(|_, entry| now - entry.issued_at <= ttl);
        before - inflight.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A poisoned arena is unrecoverable; propagating the panic is sound.
    #[allow(clippy::unwrap_used)]
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.inflight.lock().unwrap()
    }
}
