use async_trait::async_trait;

use crate::crypto::SecretString;
use crate::resolver::ProviderResponse;
use crate::AuthError;

/// Password login and TOTP step-up calls.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Submits email/password credentials.
    async fn login(&self, email: &str, password: &str) -> Result<ProviderResponse, AuthError>;

    /// Exchanges a challenge token and one-time code for tokens.
    async fn verify_totp(
        &self,
        challenge_token: &SecretString,
        code: &str,
    ) -> Result<ProviderResponse, AuthError>;
}
