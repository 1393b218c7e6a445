// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Login and password policy validation.
//!
//! Checks run in a fixed order and the first failure wins, so every
//! rejection carries exactly one specific, user-visible reason.

use std::sync::LazyLock;

use makula_core::MakulaError;
use regex::Regex;

/// Logins too trivial to allow, matched case-insensitively.
const RESERVED_LOGINS: [&str; 5] = ["admin", "user", "test", "root", "guest"];

/// The special characters a password must draw at least one from.
pub const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>_";

const MIN_LOGIN_LEN: usize = 4;
const MIN_PASSWORD_LEN: usize = 8;

static LOGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Za-z0-9_]+$").expect("static login pattern"));

/// Validates a login: length, charset, then the reserved list.
pub fn validate_login(login: &str) -> Result<(), MakulaError> {
    if login.chars().count() < MIN_LOGIN_LEN {
        return Err(MakulaError::Validation(format!(
            "login must be at least {MIN_LOGIN_LEN} characters"
        )));
    }
    if !LOGIN_RE.is_match(login) {
        return Err(MakulaError::Validation(
            "login may only contain latin letters, digits, and underscores".into(),
        ));
    }
    if RESERVED_LOGINS
        .iter()
        .any(|reserved| login.eq_ignore_ascii_case(reserved))
    {
        return Err(MakulaError::Validation(
            "this login is too simple, choose another".into(),
        ));
    }
    Ok(())
}

/// Validates a password against the complexity rules, in order:
/// length, uppercase, lowercase, digit, special character.
pub fn validate_password(password: &str) -> Result<(), MakulaError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(MakulaError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(MakulaError::Validation(
            "password must contain at least one uppercase letter".into(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(MakulaError::Validation(
            "password must contain at least one lowercase letter".into(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(MakulaError::Validation(
            "password must contain at least one digit".into(),
        ));
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err(MakulaError::Validation(format!(
            "password must contain at least one special character ({SPECIAL_CHARS})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(result: Result<(), MakulaError>) -> String {
        match result {
            Err(MakulaError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_valid_login() {
        assert!(validate_login("worker_01").is_ok());
    }

    #[test]
    fn rejects_short_login() {
        assert!(reason(validate_login("ab")).contains("at least 4"));
    }

    #[test]
    fn rejects_login_with_bad_charset() {
        assert!(reason(validate_login("worker-01")).contains("latin letters"));
        assert!(reason(validate_login("рабочий")).contains("latin letters"));
    }

    #[test]
    fn rejects_reserved_login_case_insensitively() {
        for login in ["admin", "Admin", "ROOT", "guest", "Test", "user"] {
            assert!(reason(validate_login(login)).contains("too simple"), "{login}");
        }
    }

    #[test]
    fn accepts_valid_password() {
        assert!(validate_password("Abcdef1!").is_ok());
    }

    /// Each complexity rule fails with its own reason, checked in the fixed
    /// order: length, uppercase, lowercase, digit, special.
    #[test]
    fn password_rules_fail_in_order_with_specific_reasons() {
        assert!(reason(validate_password("Ab1!")).contains("at least 8"));
        assert!(reason(validate_password("abcdef1!")).contains("uppercase"));
        assert!(reason(validate_password("ABCDEF1!")).contains("lowercase"));
        assert!(reason(validate_password("Abcdefg!")).contains("digit"));
        assert!(reason(validate_password("Abcdefg1")).contains("special character"));
    }

    /// A password failing several rules reports the earliest one.
    #[test]
    fn earliest_failing_rule_wins() {
        // Too short AND no uppercase: length is reported.
        assert!(reason(validate_password("ab1")).contains("at least 8"));
        // Long enough, missing uppercase AND digit: uppercase is reported.
        assert!(reason(validate_password("abcdefgh!")).contains("uppercase"));
    }

    #[test]
    fn underscore_counts_as_special() {
        assert!(validate_password("Abcdefg1_").is_ok());
    }
}
