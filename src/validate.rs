use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ApiError;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref MOBILE_RE: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_mobile(mobile: &str) -> bool {
    MOBILE_RE.is_match(mobile)
}

pub fn check_name(name: &str) -> Result<(), ApiError> {
    let len = name.chars().count();
    if !(3..=255).contains(&len) {
        return Err(ApiError::Validation(
            "name must be between 3 and 255 characters".into(),
        ));
    }
    Ok(())
}

pub fn check_email(email: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        return Err(ApiError::Validation("email must be a valid email".into()));
    }
    Ok(())
}

pub fn check_password(password: &str) -> Result<(), ApiError> {
    let len = password.chars().count();
    if !(8..=255).contains(&len) {
        return Err(ApiError::Validation(
            "password must be between 8 and 255 characters".into(),
        ));
    }
    Ok(())
}

pub fn check_mobile(mobile: &str) -> Result<(), ApiError> {
    if !is_valid_mobile(mobile) {
        return Err(ApiError::Validation(
            "mobileNo must be exactly 10 digits".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+tag@sub.domain.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("al ice@example.com"));
    }

    #[test]
    fn mobile_must_be_exactly_ten_digits() {
        assert!(is_valid_mobile("0123456789"));
        assert!(!is_valid_mobile("123456789"));
        assert!(!is_valid_mobile("12345678901"));
        assert!(!is_valid_mobile("12345abcde"));
        assert!(!is_valid_mobile(""));
    }

    #[test]
    fn name_bounds() {
        assert!(check_name("Al").is_err());
        assert!(check_name("Ali").is_ok());
        assert!(check_name(&"x".repeat(255)).is_ok());
        assert!(check_name(&"x".repeat(256)).is_err());
    }

    #[test]
    fn password_bounds() {
        assert!(check_password("1234567").is_err());
        assert!(check_password("12345678").is_ok());
        assert!(check_password(&"p".repeat(256)).is_err());
    }
}
