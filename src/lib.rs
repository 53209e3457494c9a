//! Session and credential lifecycle management for clients of a remote
//! identity provider.
//!
//! `vestibule` sits between an application's authentication entry points
//! (password login, TOTP step-up, passwordless codes, passkeys, password
//! reset) and the single session record that keeps a user signed in. It
//! normalizes the provider's historically inconsistent response shapes into
//! one [`AuthOutcome`], persists sessions through a pluggable
//! [`SessionStore`], and keeps access tokens fresh with a background
//! [`RefreshScheduler`] that never runs two refreshes at once.
//!
//! The crate performs no network I/O itself: each action is generic over a
//! capability trait in [`repository`] that the embedding application
//! implements against its transport. Mock implementations are available
//! behind the `mocks` feature.

pub mod actions;
pub mod ceremony;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod events;
pub mod repository;
pub mod resolver;
pub mod scheduler;
pub mod session;
pub mod token;
pub mod validators;

pub use ceremony::{CeremonyKind, CeremonyRegistry};
pub use config::AuthConfig;
pub use crypto::SecretString;
pub use events::register_event_listeners;
pub use repository::{AccountApi, AuthApi, PasskeyApi, TokenApi};
pub use resolver::{resolve, AuthOutcome, ProviderResponse};
pub use scheduler::{RefreshScheduler, TickOutcome};
pub use session::{
    InMemorySessionStore, Session, SessionManager, SessionStore, SessionUser, TokenGrant,
};
pub use validators::ValidationError;

#[cfg(any(test, feature = "mocks"))]
pub use repository::{MockAccountApi, MockAuthApi, MockPasskeyApi, MockTokenApi};

use std::fmt;

/// Errors surfaced by session management and authentication use-cases.
///
/// Repository implementations report transport problems as
/// [`AuthError::TransientFailure`]; structured rejections from the provider
/// arrive inside the response body and become
/// [`AuthError::ProviderRejected`] after resolution. Callers never see raw
/// network errors.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Input failed format validation before any network call was made.
    Validation(ValidationError),
    /// The provider responded with a structured error; message and code are
    /// passed through verbatim.
    ProviderRejected {
        message: String,
        code: Option<String>,
    },
    /// The provider responded but the body matched none of the known shapes.
    MalformedResponse,
    /// The refresh credential was rejected; the session can no longer be
    /// renewed.
    SessionExpired,
    /// An operation that requires a signed-in user found no valid session.
    Unauthenticated,
    /// `update_tokens` was called without an existing session to update.
    NoActiveSession,
    /// Network or timeout failure; eligible for retry on a later attempt.
    TransientFailure(String),
    /// A passkey finish call carried an unknown, mismatched, or expired
    /// ceremony handle.
    CeremonyMismatch,
    /// The session store failed to read or write the record.
    StorageError(String),
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Validation(err) => write!(f, "{err}"),
            AuthError::ProviderRejected { message, code } => match code {
                Some(code) => write!(f, "{message} ({code})"),
                None => write!(f, "{message}"),
            },
            AuthError::MalformedResponse => {
                write!(f, "Provider response did not match any known shape")
            }
            AuthError::SessionExpired => write!(f, "Session has expired"),
            AuthError::Unauthenticated => write!(f, "Not signed in"),
            AuthError::NoActiveSession => write!(f, "No active session to update"),
            AuthError::TransientFailure(msg) => write!(f, "Temporary failure: {msg}"),
            AuthError::CeremonyMismatch => write!(f, "Unknown or expired ceremony handle"),
            AuthError::StorageError(msg) => write!(f, "Session storage error: {msg}"),
        }
    }
}

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        AuthError::Validation(err)
    }
}

impl AuthError {
    /// Convenience constructor for provider rejections without a code.
    pub fn rejected(message: impl Into<String>) -> Self {
        AuthError::ProviderRejected {
            message: message.into(),
            code: None,
        }
    }
}
