use async_trait::async_trait;

use super::AuthEvent;

/// Receives session lifecycle events.
///
/// Implement this to react to transitions — routing on
/// [`AuthEvent::SessionInvalidated`], metrics on sign-ins, and so on.
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    async fn handle(&self, event: &AuthEvent);
}
