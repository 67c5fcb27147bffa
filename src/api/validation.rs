//! Input checks shared by request DTOs.

use regex::Regex;

use crate::errors::AppError;

lazy_static::lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9]{6,20}$").unwrap();
}

const MIN_PASSWORD_LEN: usize = 6;

pub fn validate_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    if EMAIL_RE.is_match(&email) {
        Ok(email)
    } else {
        Err(AppError::invalid("Invalid email"))
    }
}

pub fn validate_phone(phone: &str) -> Result<String, AppError> {
    let normalized = crate::services::formatting::normalize_phone(phone);
    if PHONE_RE.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(AppError::invalid("Invalid phone number"))
    }
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::invalid(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn require(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::invalid(format!("{} is required", field)))
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn ensure_max_len(value: &str, max: usize, field: &str) -> Result<(), AppError> {
    if value.chars().count() > max {
        Err(AppError::invalid(format!("{} is too long", field)))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(validate_email(" Jane@Example.com ").unwrap(), "jane@example.com");
        assert!(validate_email("jane@").is_err());
    }

    #[test]
    fn phones_are_normalised_before_matching() {
        assert_eq!(validate_phone("(555) 010-4000").unwrap(), "5550104000");
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_password("abc").is_err());
        assert!(validate_password("abcdef").is_ok());
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        assert_eq!(require("  x ", "name").unwrap(), "x");
        assert_eq!(require(" ", "name").unwrap_err().to_string(), "name is required");
        assert!(ensure_max_len("abcd", 3, "code").is_err());
    }
}
