use super::ValidationError;

pub fn validate_password(password: &str, min_length: usize) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordEmpty);
    }

    if password.chars().count() < min_length {
        return Err(ValidationError::PasswordTooShort { min: min_length });
    }

    Ok(())
}
