use super::ValidationError;

/// Validates the format of a one-time code (TOTP or emailed login code).
///
/// Accepts 6 to 8 ASCII digits, the range the provider has issued.
pub fn validate_one_time_code(code: &str) -> Result<(), ValidationError> {
    let len = code.len();
    if !(6..=8).contains(&len) || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::CodeInvalidFormat);
    }

    Ok(())
}
