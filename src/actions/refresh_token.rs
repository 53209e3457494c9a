use crate::crypto::SecretString;
use crate::repository::TokenApi;
use crate::resolver::{resolve, AuthOutcome};
use crate::session::TokenGrant;
use crate::validators::ValidationError;
use crate::AuthError;

/// Exchanges a refresh token for a new token triple.
///
/// This action does not touch the session store: callers (the refresh
/// scheduler or an explicit refresh entry point) decide whether to merge
/// the grant into the current session.
pub struct RefreshTokenAction<T: TokenApi> {
    api: T,
}

impl<T: TokenApi> RefreshTokenAction<T> {
    pub fn new(api: T) -> Self {
        RefreshTokenAction { api }
    }

    /// # Returns
    ///
    /// - `Ok(grant)` - new tokens with normalized expiry
    /// - `Err(AuthError::SessionExpired)` - the provider rejected the
    ///   refresh token; the session cannot be renewed
    /// - `Err(AuthError::TransientFailure)` - network trouble, safe to
    ///   retry on a later tick
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "refresh_token", skip_all, err)
    )]
    pub async fn execute(&self, refresh_token: &SecretString) -> Result<TokenGrant, AuthError> {
        if refresh_token.is_empty() {
            return Err(ValidationError::TokenMissing.into());
        }

        let response = self.api.refresh(refresh_token).await?;

        match resolve(&response)? {
            AuthOutcome::Authenticated { grant, .. } => {
                log::debug!(target: "vestibule::auth", "msg=\"token refresh success\"");
                Ok(grant)
            }
            AuthOutcome::ChallengeRequired { .. } => Err(AuthError::MalformedResponse),
            AuthOutcome::Rejected { .. } => {
                log::info!(target: "vestibule::auth", "msg=\"token refresh rejected\"");
                Err(AuthError::SessionExpired)
            }
        }
    }
}
