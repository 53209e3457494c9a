//! Capability traits for the identity-provider network surface.
//!
//! Each trait covers one concern; the embedding application implements
//! them against its transport (route layout, signing, retries, and
//! timeouts are the transport's business). Implementations return the
//! decoded [`ProviderResponse`](crate::ProviderResponse) body — provider
//! rejections ride *inside* the body; only transport problems become
//! [`AuthError::TransientFailure`](crate::AuthError::TransientFailure).
//!
//! # Traits
//!
//! | Trait | Concern |
//! |-------|---------|
//! | [`AuthApi`] | Password login and TOTP step-up |
//! | [`TokenApi`] | Token refresh and revocation |
//! | [`AccountApi`] | Registration, verification, recovery, passwordless |
//! | [`PasskeyApi`] | WebAuthn ceremonies and passkey management |
//!
//! # Mock Implementations
//!
//! Enable the `mocks` feature for scripted in-memory implementations:
//! [`MockAuthApi`], [`MockTokenApi`], [`MockAccountApi`],
//! [`MockPasskeyApi`].

mod account;
mod auth;
mod passkey;
mod token;

#[cfg(any(test, feature = "mocks"))]
mod account_mock;
#[cfg(any(test, feature = "mocks"))]
mod auth_mock;
#[cfg(any(test, feature = "mocks"))]
mod passkey_mock;
#[cfg(any(test, feature = "mocks"))]
mod token_mock;

pub use account::AccountApi;
pub use account::NewAccount;
pub use auth::AuthApi;
pub use passkey::CeremonyOffer;
pub use passkey::PasskeyApi;
pub use passkey::PasskeySummary;
pub use token::TokenApi;

#[cfg(any(test, feature = "mocks"))]
pub use account_mock::MockAccountApi;
#[cfg(any(test, feature = "mocks"))]
pub use auth_mock::MockAuthApi;
#[cfg(any(test, feature = "mocks"))]
pub use passkey_mock::MockPasskeyApi;
#[cfg(any(test, feature = "mocks"))]
pub use token_mock::MockTokenApi;
