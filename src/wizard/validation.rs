//! Field checks run before a step submits anything.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Criteria a signup password must meet, out of five.
pub const MIN_SIGNUP_STRENGTH: u8 = 3;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const CODE_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// A form value the current step cannot submit. Never changes the step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please enter your password")]
    MissingPassword,

    #[error("Please enter your first and last name")]
    MissingName,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password is too weak")]
    WeakPassword { strength: u8 },

    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,

    #[error("Please enter a 6-digit code")]
    InvalidCode,

    #[error("Please enter your phone number")]
    MissingPhone,

    #[error("Please wait {seconds}s before requesting a new code")]
    ResendTooSoon { seconds: u64 },
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Number of criteria met: length, lowercase, uppercase, digit, symbol.
pub fn password_strength(password: &str) -> u8 {
    let checks = [
        password.chars().count() >= MIN_PASSWORD_LEN,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    checks.into_iter().filter(|met| *met).count() as u8
}

/// Label shown under the password field.
pub fn strength_label(strength: u8) -> &'static str {
    match strength {
        0 => "Very Weak",
        1 => "Weak",
        2 => "Fair",
        3 => "Good",
        _ => "Strong",
    }
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email.trim()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

pub fn validate_signup_details(
    first_name: &str,
    last_name: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    if first_name.trim().is_empty() || last_name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    if password.is_empty() {
        return Err(ValidationError::MissingPassword);
    }
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    let strength = password_strength(password);
    if strength < MIN_SIGNUP_STRENGTH {
        return Err(ValidationError::WeakPassword { strength });
    }
    Ok(())
}

/// Verification and reset codes are exactly six digits.
pub fn validate_code(code: &str) -> Result<(), ValidationError> {
    let code = code.trim();
    if code.len() == CODE_LEN && code.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCode)
    }
}

pub fn validate_new_password(password: &str, confirm_password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.trim().is_empty() {
        Err(ValidationError::MissingPhone)
    } else {
        Ok(())
    }
}
