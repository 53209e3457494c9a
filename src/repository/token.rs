use async_trait::async_trait;

use crate::crypto::SecretString;
use crate::resolver::ProviderResponse;
use crate::AuthError;

/// Token refresh and revocation calls.
#[async_trait]
pub trait TokenApi: Send + Sync {
    /// Exchanges a refresh token for a new token triple.
    async fn refresh(&self, refresh_token: &SecretString) -> Result<ProviderResponse, AuthError>;

    /// Invalidates the refresh token server-side. Best effort.
    async fn revoke(&self, refresh_token: &SecretString) -> Result<(), AuthError>;
}
