use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::crypto::SecretString;
use crate::resolver::ProviderResponse;
use crate::AuthError;

/// The provider's half of a ceremony begin call: WebAuthn options to hand
/// to the authenticator plus the handle that correlates the finish call.
#[derive(Debug, Clone, Deserialize)]
pub struct CeremonyOffer {
    /// Opaque WebAuthn options, passed through to the authenticator.
    pub options: serde_json::Value,
    #[serde(alias = "sessionId", alias = "session_id")]
    pub ceremony_id: String,
}

/// A registered passkey as listed by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct PasskeySummary {
    pub id: String,
    pub name: Option<String>,
    #[serde(alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// WebAuthn ceremony and passkey management calls.
#[async_trait]
pub trait PasskeyApi: Send + Sync {
    async fn login_begin(&self) -> Result<CeremonyOffer, AuthError>;

    async fn login_finish(
        &self,
        ceremony_id: &str,
        credential: &serde_json::Value,
    ) -> Result<ProviderResponse, AuthError>;

    async fn register_begin(
        &self,
        access_token: &SecretString,
    ) -> Result<CeremonyOffer, AuthError>;

    async fn register_finish(
        &self,
        ceremony_id: &str,
        credential: &serde_json::Value,
    ) -> Result<ProviderResponse, AuthError>;

    async fn list_passkeys(
        &self,
        access_token: &SecretString,
    ) -> Result<Vec<PasskeySummary>, AuthError>;

    async fn remove_passkey(
        &self,
        access_token: &SecretString,
        passkey_id: &str,
    ) -> Result<(), AuthError>;
}
