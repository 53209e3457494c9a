use crate::repository::AccountApi;
use crate::validators::validate_email;
use crate::AuthError;

/// Requests a passwordless one-time login code.
///
/// Enumeration-protected the same way as
/// [`RequestPasswordResetAction`](super::RequestPasswordResetAction):
/// always succeeds past format validation.
pub struct RequestLoginCodeAction<A: AccountApi> {
    api: A,
}

impl<A: AccountApi> RequestLoginCodeAction<A> {
    pub fn new(api: A) -> Self {
        RequestLoginCodeAction { api }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "request_login_code", skip_all, err)
    )]
    pub async fn execute(&self, email: &str) -> Result<(), AuthError> {
        validate_email(email)?;

        if let Err(err) = self.api.request_login_code(email).await {
            log::debug!(
                target: "vestibule::auth",
                "msg=\"login code request failure suppressed\" error=\"{err}\""
            );
        }

        log::info!(target: "vestibule::auth", "msg=\"login code requested\"");
        Ok(())
    }
}
