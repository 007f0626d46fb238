//! Field validators for the intake dialogue
//!
//! Pure functions: no transport or storage access. Lengths are measured in
//! characters after trimming surrounding whitespace.

use thiserror::Error;

pub const NAME_MAX_CHARS: usize = 100;
pub const ADDRESS_MAX_CHARS: usize = 255;
pub const AGE_MIN: u8 = 13;
pub const AGE_MAX: u8 = 120;

/// Why a field value was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Not a base-10 integer
    #[error("not a valid number")]
    Parse,
    /// A number, but outside the accepted range
    #[error("value out of range ({AGE_MIN}-{AGE_MAX})")]
    Range,
    /// Empty after trimming, or too long
    #[error("invalid text format")]
    Format,
}

/// Validate a full name. Returns the trimmed name.
pub fn validate_name(text: &str) -> Result<String, ValidationError> {
    bounded_text(text, NAME_MAX_CHARS)
}

/// Validate an age. Returns the parsed value.
pub fn validate_age(text: &str) -> Result<u8, ValidationError> {
    // i128 so that long digit strings still read as numbers (range failure,
    // not parse failure) unless they overflow even that.
    let value: i128 = text.trim().parse().map_err(|_| ValidationError::Parse)?;
    if value < i128::from(AGE_MIN) || value > i128::from(AGE_MAX) {
        return Err(ValidationError::Range);
    }
    u8::try_from(value).map_err(|_| ValidationError::Range)
}

/// Validate a postal address. Returns the trimmed address.
pub fn validate_address(text: &str) -> Result<String, ValidationError> {
    bounded_text(text, ADDRESS_MAX_CHARS)
}

#[allow(dead_code)] // Pass/fail form of validate_name
pub fn is_valid_name(text: &str) -> bool {
    validate_name(text).is_ok()
}

#[allow(dead_code)] // Pass/fail form of validate_address
pub fn is_valid_address(text: &str) -> bool {
    validate_address(text).is_ok()
}

fn bounded_text(text: &str, max_chars: usize) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > max_chars {
        return Err(ValidationError::Format);
    }
    Ok(trimmed.to_string())
}
