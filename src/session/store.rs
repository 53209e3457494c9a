//! Session storage trait.

use async_trait::async_trait;

use crate::AuthError;

use super::Session;

/// Durable persistence of the single session record per client.
///
/// Implementations provide different backends:
/// - [`InMemorySessionStore`](super::InMemorySessionStore): in-memory, for
///   tests and single-process deployments
/// - a sealed-cookie backend built on
///   [`seal_session`](super::seal_session) /
///   [`unseal_session`](super::unseal_session) at the HTTP boundary
///
/// `save` and `delete` are assumed atomic at the storage layer (a cookie
/// write or equivalent single-record write).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists the record, replacing any previous one.
    async fn save(&self, session: &Session) -> Result<(), AuthError>;

    /// Loads the current record, if any.
    async fn load(&self) -> Result<Option<Session>, AuthError>;

    /// Removes the record. Deleting an absent record is not an error.
    async fn delete(&self) -> Result<(), AuthError>;
}
