//! One use-case per file: compose a repository capability, the resolver,
//! and the session manager into a single `execute` entry point.
//!
//! Every action catches its repository's failures and converts them into
//! one typed result; callers never see raw transport errors. The
//! enumeration-protected request actions go further and swallow provider
//! and transport failures entirely.

pub mod login;
pub mod logout;
pub mod passkey_login;
pub mod passkey_management;
pub mod passkey_registration;
pub mod refresh_token;
pub mod register;
pub mod request_login_code;
pub mod request_password_reset;
pub mod resend_verification;
pub mod reset_password;
pub mod verify_email;
pub mod verify_login_code;
pub mod verify_totp;

pub use login::{ChallengeState, LoginAction, LoginOutcome};
pub use logout::LogoutAction;
pub use passkey_login::PasskeyLoginAction;
pub use passkey_management::PasskeyManagementAction;
pub use passkey_registration::PasskeyRegistrationAction;
pub use refresh_token::RefreshTokenAction;
pub use register::{RegisterAction, RegisterOutcome};
pub use request_login_code::RequestLoginCodeAction;
pub use request_password_reset::RequestPasswordResetAction;
pub use resend_verification::ResendVerificationAction;
pub use reset_password::ResetPasswordAction;
pub use verify_email::VerifyEmailAction;
pub use verify_login_code::VerifyLoginCodeAction;
pub use verify_totp::VerifyTotpAction;

use crate::crypto::SecretString;
use crate::session::SessionUser;
use crate::{token, AuthError};

/// Builds the session's identity projection from an access token's
/// unverified claims.
///
/// Passkey finish responses carry tokens but no user object, so the
/// display identity comes from the token payload. This is identity
/// extraction after the provider has already authenticated — the claims
/// are never an authorization input.
pub(crate) fn session_user_from_token(access_token: &SecretString) -> Result<SessionUser, AuthError> {
    let claims = token::decode(access_token.expose_secret()).ok_or(AuthError::MalformedResponse)?;

    let id = claims
        .sub
        .filter(|sub| !sub.is_empty())
        .ok_or(AuthError::MalformedResponse)?;

    Ok(SessionUser {
        id,
        email: claims.email.unwrap_or_default(),
        display_name: claims.name,
        role: None,
        email_verified: false,
    })
}
