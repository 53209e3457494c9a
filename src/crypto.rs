use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Default length of generated opaque handles.
pub const DEFAULT_HANDLE_LENGTH: usize = 32;

/// A wrapper for sensitive string data that prevents accidental logging.
///
/// `SecretString` implements `Debug` and `Display` to show `[REDACTED]`
/// instead of the actual content. Access/refresh tokens and challenge
/// tokens are carried in this wrapper throughout the crate.
///
/// # Example
///
/// ```rust
/// use vestibule::crypto::SecretString;
///
/// let token = SecretString::new("opaque-access-token");
/// assert_eq!(format!("{:?}", token), "SecretString([REDACTED])");
/// assert_eq!(token.expose_secret(), "opaque-access-token");
/// ```
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Creates a new `SecretString` from any type convertible to a `String`.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the secret value.
    ///
    /// Use only at the point the credential is actually needed, such as
    /// attaching it to an outgoing request.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns true if the wrapped value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // The real value must round-trip through the sealed session payload.
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SecretString(s))
    }
}

/// Generates a cryptographically secure random alphanumeric handle.
///
/// Used for locally issued identifiers (never for credentials — those come
/// from the provider).
pub fn generate_handle(length: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_handle_length() {
        assert_eq!(generate_handle(32).len(), 32);
        assert_eq!(generate_handle(48).len(), 48);
    }

    #[test]
    fn test_generate_handle_unique() {
        assert_ne!(generate_handle(32), generate_handle(32));
    }

    #[test]
    fn test_generate_handle_alphanumeric() {
        let handle = generate_handle(100);
        assert!(handle.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_secret_string_debug_redacted() {
        let secret = SecretString::new("token-value");
        assert_eq!(format!("{secret:?}"), "SecretString([REDACTED])");
    }

    #[test]
    fn test_secret_string_display_redacted() {
        let secret = SecretString::new("token-value");
        assert_eq!(format!("{secret}"), "[REDACTED]");
    }

    #[test]
    fn test_secret_string_expose() {
        let secret = SecretString::new("token-value");
        assert_eq!(secret.expose_secret(), "token-value");
        assert!(!secret.is_empty());
        assert!(SecretString::new("").is_empty());
    }

    #[test]
    fn test_secret_string_serde_round_trip() {
        let secret = SecretString::new("token-value");
        let json = serde_json::to_string(&secret).unwrap();
        assert_eq!(json, "\"token-value\"");

        let back: SecretString = serde_json::from_str(&json).unwrap();
        assert_eq!(back, secret);
    }
}
