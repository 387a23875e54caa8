//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API. They centralize the
//! shape checks every operation runs before touching the database.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::{EngineError, ResultEngine};

/// Password length bounds, in characters, both inclusive.
pub const MIN_PASSWORD_LEN: usize = 4;
pub const MAX_PASSWORD_LEN: usize = 50;
/// Group assigned to roles created without one.
pub const DEFAULT_ROLE_GROUP: &str = "Global Roles";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[allow(clippy::expect_used)]
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,50}$").expect("Invalid regex"));

#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex"));

/// Shape checks for a login attempt.
pub(crate) fn validate_login_input(username: &str, password: &str) -> ResultEngine<()> {
    if username.is_empty() || password.is_empty() {
        return Err(EngineError::Validation(
            "username and password are required".to_string(),
        ));
    }
    validate_new_password(password)
}

/// Shape checks for a password that is about to be hashed and stored.
pub(crate) fn validate_new_password(password: &str) -> ResultEngine<()> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(EngineError::Validation(format!(
            "password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

pub(crate) fn validate_username(username: &str) -> ResultEngine<()> {
    if !NAME_RE.is_match(username) {
        return Err(EngineError::Validation(
            "username must be 3-50 characters long and contain only letters, numbers, or underscores"
                .to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_role_name(name: &str) -> ResultEngine<()> {
    if !NAME_RE.is_match(name) {
        return Err(EngineError::Validation(
            "role name must be 3-50 characters, alphanumeric with underscores".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_email(email: &str) -> ResultEngine<()> {
    if !EMAIL_RE.is_match(email) {
        return Err(EngineError::Validation("invalid email format".to_string()));
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` date.
pub(crate) fn parse_date(value: &str) -> ResultEngine<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        EngineError::Validation("invalid date format, use YYYY-MM-DD".to_string())
    })
}

/// Trim `value` and reject it when empty or longer than `max` characters.
pub(crate) fn normalize_required_text(value: &str, label: &str, max: usize) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} is required")));
    }
    if trimmed.chars().count() > max {
        return Err(EngineError::Validation(format!(
            "{label} cannot exceed {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Like [`normalize_required_text`], but a missing or blank value is `None`.
pub(crate) fn normalize_bounded_text(
    value: Option<&str>,
    label: &str,
    max: usize,
) -> ResultEngine<Option<String>> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => normalize_required_text(value, label, max).map(Some),
        _ => Ok(None),
    }
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_both_fields() {
        assert!(validate_login_input("", "secret").is_err());
        assert!(validate_login_input("alice", "").is_err());
    }

    #[test]
    fn login_password_length() {
        assert_eq!(
            validate_login_input("alice", "abc"),
            Err(EngineError::Validation(
                "password must be between 4 and 50 characters long".to_string()
            ))
        );
        assert!(validate_login_input("alice", "abcd").is_ok());
        assert!(validate_login_input("alice", &"x".repeat(51)).is_err());
    }

    #[test]
    fn new_password_has_upper_bound() {
        assert!(validate_new_password(&"x".repeat(50)).is_ok());
        assert!(validate_new_password(&"x".repeat(51)).is_err());
    }

    #[test]
    fn patterns_compile() {
        assert!(NAME_RE.is_match("abc"));
        assert!(EMAIL_RE.is_match("a@b.c"));
    }

    #[test]
    fn usernames() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("al").is_err());
        assert!(validate_username("alice smith").is_err());
    }

    #[test]
    fn emails() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("alice@example").is_err());
        assert!(validate_email("a lice@example.com").is_err());
    }

    #[test]
    fn dates_round_trip_through_iso_format() {
        let date = parse_date(" 2024-02-29 ").unwrap();
        assert_eq!(date.to_string(), "2024-02-29");
        assert!(parse_date("29/02/2024").is_err());
        assert!(parse_date("2023-02-29").is_err());
    }

    #[test]
    fn required_text_is_trimmed_and_bounded() {
        assert_eq!(
            normalize_required_text("  rent ", "category", 255).unwrap(),
            "rent"
        );
        assert!(normalize_required_text("   ", "category", 255).is_err());
        assert!(normalize_required_text(&"x".repeat(256), "category", 255).is_err());
    }

    #[test]
    fn bounded_text_is_optional() {
        assert_eq!(normalize_bounded_text(None, "remarks", 5).unwrap(), None);
        assert_eq!(normalize_bounded_text(Some("  "), "remarks", 5).unwrap(), None);
        assert_eq!(
            normalize_bounded_text(Some(" ok "), "remarks", 5).unwrap(),
            Some("ok".to_string())
        );
        assert!(normalize_bounded_text(Some("too long"), "remarks", 5).is_err());
    }
}
