use crate::repository::AccountApi;
use crate::validators::validate_email;
use crate::AuthError;

/// Starts the forgot-password flow.
///
/// Enumeration-protected: the outcome is identical whether or not the
/// email belongs to an account, and identical whether the upstream call
/// succeeded, was rejected, or failed in transit. The only observable
/// failure is a malformed email, which is checked before any network
/// traffic.
pub struct RequestPasswordResetAction<A: AccountApi> {
    api: A,
}

impl<A: AccountApi> RequestPasswordResetAction<A> {
    pub fn new(api: A) -> Self {
        RequestPasswordResetAction { api }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "request_password_reset", skip_all, err)
    )]
    pub async fn execute(&self, email: &str) -> Result<(), AuthError> {
        validate_email(email)?;

        match self.api.request_password_reset(email).await {
            Ok(response) => {
                if let Some(error) = response.error {
                    log::debug!(
                        target: "vestibule::auth",
                        "msg=\"password reset request upstream error suppressed\" code=\"{}\"",
                        error.code().unwrap_or("-")
                    );
                }
            }
            Err(err) => {
                log::debug!(
                    target: "vestibule::auth",
                    "msg=\"password reset request failure suppressed\" error=\"{err}\""
                );
            }
        }

        log::info!(target: "vestibule::auth", "msg=\"password reset requested\"");
        Ok(())
    }
}
