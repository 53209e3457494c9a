use async_trait::async_trait;

use crate::crypto::SecretString;
use crate::resolver::ProviderResponse;
use crate::AuthError;

/// Payload for account creation.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: SecretString,
    pub display_name: Option<String>,
}

/// Registration, email verification, recovery, and passwordless calls.
///
/// The send-style operations (`resend_verification`,
/// `request_password_reset`, `request_login_code`) target endpoints that
/// respond success-shaped regardless of account existence; the actions
/// built on them additionally swallow transport failures to keep that
/// guarantee.
#[async_trait]
pub trait AccountApi: Send + Sync {
    async fn register(&self, account: &NewAccount) -> Result<ProviderResponse, AuthError>;

    /// Confirms an emailed verification token.
    async fn verify_email(&self, token: &str) -> Result<ProviderResponse, AuthError>;

    /// Requests a fresh verification email.
    async fn resend_verification(&self, email: &str) -> Result<ProviderResponse, AuthError>;

    /// Starts the forgot-password flow.
    async fn request_password_reset(&self, email: &str) -> Result<ProviderResponse, AuthError>;

    /// Completes a password reset with the emailed token.
    async fn reset_password(
        &self,
        token: &str,
        new_password: &SecretString,
    ) -> Result<ProviderResponse, AuthError>;

    /// Requests a passwordless one-time login code.
    async fn request_login_code(&self, email: &str) -> Result<ProviderResponse, AuthError>;

    /// Exchanges a passwordless code for tokens.
    async fn verify_login_code(
        &self,
        email: &str,
        code: &str,
    ) -> Result<ProviderResponse, AuthError>;
}
