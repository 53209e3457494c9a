//! Input-format validation performed before any network call.
//!
//! These checks are about *format* only. They are allowed to fail visibly;
//! whether an account actually exists must never be observable from an
//! enumeration-protected operation (see the request actions).

mod code;
mod email;
mod password;

pub use code::validate_one_time_code;
pub use email::validate_email;
pub use password::validate_password;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmailEmpty,
    EmailTooLong,
    EmailInvalidFormat,
    PasswordEmpty,
    PasswordTooShort { min: usize },
    CodeInvalidFormat,
    ChallengeMissing,
    TokenMissing,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmailEmpty => write!(f, "Email cannot be empty"),
            ValidationError::EmailTooLong => write!(f, "Email is too long (max 254 characters)"),
            ValidationError::EmailInvalidFormat => write!(f, "Invalid email format"),
            ValidationError::PasswordEmpty => write!(f, "Password cannot be empty"),
            ValidationError::PasswordTooShort { min } => {
                write!(f, "Password must be at least {min} characters")
            }
            ValidationError::CodeInvalidFormat => write!(f, "Code must be 6 to 8 digits"),
            ValidationError::ChallengeMissing => write!(f, "No pending challenge to complete"),
            ValidationError::TokenMissing => write!(f, "Token cannot be empty"),
        }
    }
}

impl std::error::Error for ValidationError {}
