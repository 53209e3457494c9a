use crate::repository::AccountApi;
use crate::validators::validate_email;
use crate::AuthError;

/// Requests a fresh verification email.
///
/// Enumeration-protected: succeeds past format validation regardless of
/// whether the address belongs to an account or is already verified.
pub struct ResendVerificationAction<A: AccountApi> {
    api: A,
}

impl<A: AccountApi> ResendVerificationAction<A> {
    pub fn new(api: A) -> Self {
        ResendVerificationAction { api }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "resend_verification", skip_all, err)
    )]
    pub async fn execute(&self, email: &str) -> Result<(), AuthError> {
        validate_email(email)?;

        if let Err(err) = self.api.resend_verification(email).await {
            log::debug!(
                target: "vestibule::auth",
                "msg=\"resend verification failure suppressed\" error=\"{err}\""
            );
        }

        log::info!(target: "vestibule::auth", "msg=\"verification email requested\"");
        Ok(())
    }
}
