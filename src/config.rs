//! Configuration for session lifetimes, refresh policy, and input rules.
//!
//! # Example
//!
//! ```rust
//! use vestibule::config::{AuthConfig, RefreshConfig};
//! use chrono::Duration;
//!
//! // Use defaults
//! let config = AuthConfig::default();
//!
//! // Or customize
//! let config = AuthConfig {
//!     refresh: RefreshConfig {
//!         threshold: Duration::minutes(2),
//!     },
//!     ..Default::default()
//! };
//! ```

use chrono::Duration;

/// Main configuration struct.
///
/// `AuthConfig::default()` gives production defaults; [`AuthConfig::strict`]
/// tightens every window.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token refresh policy.
    pub refresh: RefreshConfig,

    /// Passkey ceremony correlation settings.
    pub ceremonies: CeremonyConfig,

    /// Password format policy applied before any network call.
    pub passwords: PasswordPolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            refresh: RefreshConfig::default(),
            ceremonies: CeremonyConfig::default(),
            passwords: PasswordPolicy::default(),
        }
    }
}

impl AuthConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tighter windows: refresh earlier, expire ceremonies sooner, require
    /// longer passwords.
    pub fn strict() -> Self {
        Self {
            refresh: RefreshConfig {
                threshold: Duration::minutes(10),
            },
            ceremonies: CeremonyConfig {
                ttl: Duration::minutes(2),
            },
            passwords: PasswordPolicy { min_length: 12 },
        }
    }
}

/// Policy for background token refresh.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// A refresh becomes due when the access token's remaining lifetime
    /// drops below this margin.
    ///
    /// Default: 5 minutes
    pub threshold: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            threshold: Duration::seconds(crate::clock::DEFAULT_REFRESH_THRESHOLD_SECS),
        }
    }
}

/// Policy for passkey begin/finish correlation handles.
#[derive(Debug, Clone)]
pub struct CeremonyConfig {
    /// How long a begin handle stays exchangeable for its finish call.
    ///
    /// Default: 5 minutes
    pub ttl: Duration,
}

impl Default for CeremonyConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(5),
        }
    }
}

/// Format rules for passwords submitted to registration and reset.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    /// Minimum password length in characters.
    ///
    /// Default: 8
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}
