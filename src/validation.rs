//! Field validators shared by the cafe and employee services.
//!
//! All of these are pure predicates. Callers decide whether a failed check
//! rejects the request or silently drops the offending value.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_%+-]+(?:\.[A-Za-z0-9_%+-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$",
    )
    .expect("valid email regex")
});

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}$")
        .expect("valid uuid regex")
});

static EMPLOYEE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^UI[A-Z0-9]{7}$").expect("valid employee id regex"));

pub const PHONE_NUMBER_LENGTH: usize = 8;
pub const INVALID_EMAIL: &str = "Invalid email format";
pub const INVALID_PHONE: &str = "Invalid phone number format";

/// `local@domain.tld` shaped addresses; no whitespace, exactly one `@`,
/// no empty dot-separated parts and no hyphen at either end of a domain label.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Local mobile numbers: eight ASCII digits starting with 8 or 9.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == PHONE_NUMBER_LENGTH
        && phone.bytes().all(|b| b.is_ascii_digit())
        && matches!(phone.as_bytes().first(), Some(b'8' | b'9'))
}

/// Canonical hyphenated UUID layout, hex digits in either case.
pub fn is_valid_cafe_id(id: &str) -> bool {
    UUID_RE.is_match(id)
}

pub fn is_valid_employee_id(id: &str) -> bool {
    EMPLOYEE_ID_RE.is_match(id)
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        let mut err = ValidationError::new("email");
        err.message = Some(INVALID_EMAIL.into());
        Err(err)
    }
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if is_valid_phone(phone) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_number");
        err.message = Some(INVALID_PHONE.into());
        Err(err)
    }
}
