use chrono::{DateTime, Utc};

/// The modality that produced a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Password,
    Totp,
    LoginCode,
    Passkey,
    PasswordReset,
    EmailVerification,
}

impl AuthMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Totp => "totp",
            Self::LoginCode => "login_code",
            Self::Passkey => "passkey",
            Self::PasswordReset => "password_reset",
            Self::EmailVerification => "email_verification",
        }
    }
}

/// Session lifecycle events.
///
/// Events are always fired; with no registered listeners they are a
/// no-op. Register listeners via
/// [`register_event_listeners`](crate::register_event_listeners).
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn {
        user_id: String,
        method: AuthMethod,
        at: DateTime<Utc>,
    },
    ChallengeIssued {
        email: String,
        at: DateTime<Utc>,
    },
    SignedOut {
        at: DateTime<Utc>,
    },
    SessionRefreshed {
        expires_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// The session could not be renewed and was cleared; the application
    /// should route to a signed-out entry point.
    SessionInvalidated {
        reason: String,
        at: DateTime<Utc>,
    },
    RegistrationSubmitted {
        email: String,
        at: DateTime<Utc>,
    },
    EmailVerified {
        at: DateTime<Utc>,
    },
}

impl AuthEvent {
    /// Returns a dot-separated event name for logging/tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SignedIn { .. } => "session.signed_in",
            Self::ChallengeIssued { .. } => "auth.challenge_issued",
            Self::SignedOut { .. } => "session.signed_out",
            Self::SessionRefreshed { .. } => "session.refreshed",
            Self::SessionInvalidated { .. } => "session.invalidated",
            Self::RegistrationSubmitted { .. } => "account.registration_submitted",
            Self::EmailVerified { .. } => "account.email_verified",
        }
    }

    /// Returns when this event occurred.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::SignedIn { at, .. }
            | Self::ChallengeIssued { at, .. }
            | Self::SignedOut { at }
            | Self::SessionRefreshed { at, .. }
            | Self::SessionInvalidated { at, .. }
            | Self::RegistrationSubmitted { at, .. }
            | Self::EmailVerified { at } => *at,
        }
    }
}
