//! Input validation utilities for the service layer.
//!
//! Every function returns a field-level `Error::Validation` so handlers can
//! report which input was rejected.

use chrono::NaiveDate;

use crate::error::{Error, Result};

/// Lowercased, trimmed form used for every email comparison and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates email format using structural checks
///
/// ```
/// use reva::validation::validate_email;
///
/// validate_email("guest@reva.example").unwrap();
/// assert!(validate_email("invalid-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(Error::validation("email", "Email cannot be empty"));
    }

    if email.len() > 254 {
        return Err(Error::validation("email", "Email address is too long (max 254 characters)"));
    }

    let Some((local_part, domain)) = email.split_once('@') else {
        return Err(Error::validation("email", "Invalid email format: must contain @ symbol"));
    };

    if domain.contains('@') {
        return Err(Error::validation("email", "Invalid email format: must contain exactly one @ symbol"));
    }

    if local_part.is_empty() || local_part.len() > 64 {
        return Err(Error::validation("email", "Invalid email format: bad local part"));
    }

    if domain.is_empty() || domain.len() > 253 || !domain.contains('.') {
        return Err(Error::validation("email", "Invalid email format: bad domain"));
    }

    if email.contains("..") {
        return Err(Error::validation("email", "Invalid email format: cannot contain consecutive dots"));
    }

    let invalid_chars = ['<', '>', '(', ')', '[', ']', '\\', ',', ';', ':', '"', ' '];
    if let Some(c) = invalid_chars.iter().find(|c| email.contains(**c)) {
        return Err(Error::validation("email", format!("Invalid email format: cannot contain '{}'", c)));
    }

    Ok(())
}

/// Validates password strength and format
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(Error::validation("password", "Password must be at least 8 characters long"));
    }

    if password.len() > 128 {
        return Err(Error::validation("password", "Password is too long (max 128 characters)"));
    }

    let lowered = password.to_lowercase();
    if ["password", "12345678", "qwerty123", "admin123"].contains(&lowered.as_str()) {
        return Err(Error::validation("password", "Password is too common and weak"));
    }

    if password.contains(' ') {
        return Err(Error::validation("password", "Password cannot contain spaces"));
    }

    Ok(())
}

/// Validates a person's display name
pub fn validate_full_name(name: &str) -> Result<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::validation("name", "Name cannot be empty"));
    }

    if name.chars().count() > 100 {
        return Err(Error::validation("name", "Name must be less than 100 characters"));
    }

    if !name
        .chars()
        .all(|c| c.is_alphabetic() || c.is_whitespace() || c == '-' || c == '\'' || c == '.')
    {
        return Err(Error::validation(
            "name",
            "Name can only contain letters, spaces, hyphens, apostrophes, and periods",
        ));
    }

    Ok(())
}

/// One-time codes are exactly six ASCII digits.
pub fn validate_otp_code(code: &str) -> Result<()> {
    let code = code.trim();
    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::validation("code", "Code must be 6 digits"));
    }
    Ok(())
}

/// Session tokens are 32 random bytes, hex-encoded.
pub fn validate_session_token(token: &str) -> Result<()> {
    let token = token.trim();

    if token.is_empty() {
        return Err(Error::validation("token", "Session token cannot be empty"));
    }

    if token.len() != 64 || !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::validation("token", "Invalid token format"));
    }

    Ok(())
}

/// Validates that a string is not empty after trimming and returns the trimmed value.
pub fn validate_required_string(input: &str, field_name: &str) -> Result<String> {
    let sanitized = input.trim().to_string();

    if sanitized.is_empty() {
        return Err(Error::validation(field_name, format!("{} cannot be empty", field_name)));
    }

    Ok(sanitized)
}

/// Prices are finite and not negative.
pub fn validate_price(value: f64, field_name: &str) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::validation(field_name, format!("{} must be a non-negative amount", field_name)));
    }
    Ok(())
}

/// Check-out must come strictly after check-in.
pub fn validate_date_order(check_in: NaiveDate, check_out: NaiveDate) -> Result<()> {
    if check_out <= check_in {
        return Err(Error::validation("check_out", "Check-out must be after check-in"));
    }
    Ok(())
}

/// Guest-facing stay validation: check-in not before `today`, check-out after
/// check-in. Returns the number of nights (at least one).
pub fn validate_stay(check_in: NaiveDate, check_out: NaiveDate, today: NaiveDate) -> Result<i64> {
    if check_in < today {
        return Err(Error::validation("check_in", "Check-in cannot be in the past"));
    }
    validate_date_order(check_in, check_out)?;

    Ok((check_out - check_in).num_days())
}
