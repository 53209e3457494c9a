//! The session record and its persistence and lifecycle layers.

mod cookie;
mod manager;
mod memory_store;
mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use cookie::{seal_session, unseal_session};
pub use manager::SessionManager;
pub use memory_store::InMemorySessionStore;
pub use store::SessionStore;

use crate::crypto::SecretString;

/// The application's identity projection, decoupled from whatever shape
/// the provider returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub email_verified: bool,
}

/// A freshly issued access/refresh token pair with its normalized expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenGrant {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub expires_at: DateTime<Utc>,
}

/// The single authenticated-state record.
///
/// A `Session` is either fully populated or does not exist; partial
/// records are never persisted. `expires_at` is always the normalized
/// instant — raw provider stamps are converted on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub expires_at: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        crate::clock::is_expired(self.expires_at, now)
    }

    /// True when every required field is present. Used on load to reject
    /// records a buggy or tampered store hands back.
    pub(crate) fn is_complete(&self) -> bool {
        !self.user.id.is_empty()
            && !self.access_token.is_empty()
            && !self.refresh_token.is_empty()
    }
}
