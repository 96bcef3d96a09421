use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::error::{ApiError, Violation};
use crate::entities::campaigns::CampaignAccessibility;

/// Anchored single-address pattern. Deliberately stricter than a full
/// RFC 5322 grammar: one local part, one domain with at least one dot label.
fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
        )
        .expect("email pattern is valid")
    })
}

/// Collect aggregated violations into a single validation failure, or pass
/// when every provided field was acceptable. Absent fields never reach the
/// individual rules, which keeps validation nil-safe.
pub fn ensure_valid(violations: Vec<Violation>) -> Result<(), ApiError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(violations))
    }
}

pub fn validate_id(field: &'static str, id: i32) -> Option<Violation> {
    (id < 1).then(|| Violation {
        field,
        message: format!("'{field}' must be a positive integer"),
    })
}

pub fn validate_email(field: &'static str, value: &str) -> Option<Violation> {
    (!email_regex().is_match(value)).then(|| Violation {
        field,
        message: format!("'{field}' is not a valid email address"),
    })
}

pub fn validate_password(field: &'static str, value: &str) -> Option<Violation> {
    let printable_ascii = value.chars().all(|c| c.is_ascii_graphic() || c == ' ');
    (!printable_ascii || value.len() < 5).then(|| Violation {
        field,
        message: format!("'{field}' must be printable ASCII and at least 5 characters long"),
    })
}

/// First/last names: letters only, at least two of them.
pub fn validate_person_name(field: &'static str, value: &str) -> Option<Violation> {
    let letters_only = !value.is_empty() && value.chars().all(char::is_alphabetic);
    (!letters_only || value.chars().count() < 2).then(|| Violation {
        field,
        message: format!("'{field}' must contain only letters and be at least 2 characters long"),
    })
}

/// Usernames: alphanumeric with at least one letter, at least two characters.
pub fn validate_username(field: &'static str, value: &str) -> Option<Violation> {
    let alphanumeric = !value.is_empty() && value.chars().all(char::is_alphanumeric);
    let has_letter = value.chars().any(char::is_alphabetic);
    (!alphanumeric || !has_letter || value.chars().count() < 2).then(|| Violation {
        field,
        message: format!(
            "'{field}' must be alphanumeric with at least one letter and at least 2 characters long"
        ),
    })
}

/// Dates arrive as RFC 3339 strings and must be strictly in the past.
pub fn validate_past_date(field: &'static str, value: &str) -> Option<Violation> {
    let in_past = DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc) < Utc::now())
        .unwrap_or(false);
    (!in_past).then(|| Violation {
        field,
        message: format!("'{field}' must be an RFC 3339 date in the past"),
    })
}

/// Campaign names: letters, digits and whitespace, with at least one letter.
/// Rejects pure-whitespace and pure-digit names.
pub fn validate_campaign_name(field: &'static str, value: &str) -> Option<Violation> {
    let allowed = value
        .chars()
        .all(|c| c.is_alphanumeric() || c.is_whitespace());
    let has_letter = value.chars().any(char::is_alphabetic);
    (!allowed || !has_letter).then(|| Violation {
        field,
        message: format!(
            "'{field}' must contain only letters, numbers and whitespace, with at least one letter"
        ),
    })
}

pub fn validate_accessibility(field: &'static str, value: i32) -> Option<Violation> {
    let max = CampaignAccessibility::variant_count() - 1;
    (value < 0 || value > max).then(|| Violation {
        field,
        message: format!("'{field}' must be between 0 and {max}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("id", 1).is_none());
        assert!(validate_id("id", 12345).is_none());
        assert!(validate_id("id", 0).is_some());
        assert!(validate_id("id", -1).is_some());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email", "gm@table.example").is_none());
        assert!(validate_email("email", "first.last+tag@mail.example.org").is_none());
        assert!(validate_email("email", "").is_some());
        assert!(validate_email("email", "no-at-sign").is_some());
        assert!(validate_email("email", "user@localhost").is_some());
        assert!(validate_email("email", "user@@double.example").is_some());
        // two concatenated addresses must not slip through
        assert!(validate_email("email", "a@b.example c@d.example").is_some());
        assert!(validate_email("email", "a@b.example,c@d.example").is_some());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password", "12345").is_none());
        assert!(validate_password("password", "correct horse battery").is_none());
        assert!(validate_password("password", "1234").is_some());
        assert!(validate_password("password", "pässwörter").is_some());
        assert!(validate_password("password", "tab\tchar").is_some());
    }

    #[test]
    fn test_validate_person_name() {
        assert!(validate_person_name("firstName", "Ada").is_none());
        assert!(validate_person_name("firstName", "Åse").is_none());
        assert!(validate_person_name("firstName", "A").is_some());
        assert!(validate_person_name("firstName", "Anne-Marie").is_some());
        assert!(validate_person_name("firstName", "R2D2").is_some());
        assert!(validate_person_name("firstName", "").is_some());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("username", "kestrel7").is_none());
        assert!(validate_username("username", "a1").is_none());
        assert!(validate_username("username", "77").is_some());
        assert!(validate_username("username", "k").is_some());
        assert!(validate_username("username", "bad name").is_some());
        assert!(validate_username("username", "").is_some());
    }

    #[test]
    fn test_validate_past_date() {
        assert!(validate_past_date("startDate", "2001-01-01T00:00:00Z").is_none());
        assert!(validate_past_date("startDate", "2999-01-01T00:00:00Z").is_some());
        assert!(validate_past_date("startDate", "not a date").is_some());
        assert!(validate_past_date("startDate", "").is_some());
    }

    #[test]
    fn test_validate_campaign_name() {
        assert!(validate_campaign_name("name", "Glorious adventure 3").is_none());
        assert!(validate_campaign_name("name", "Bad Name &%").is_some());
        assert!(validate_campaign_name("name", "   ").is_some());
        assert!(validate_campaign_name("name", "12345").is_some());
        assert!(validate_campaign_name("name", "").is_some());
    }

    #[test]
    fn test_validate_accessibility() {
        assert!(validate_accessibility("accessibilityInt", 0).is_none());
        assert!(validate_accessibility("accessibilityInt", 1).is_none());
        assert!(validate_accessibility("accessibilityInt", -1).is_some());
        assert!(validate_accessibility("accessibilityInt", 2).is_some());
        assert!(validate_accessibility("accessibilityInt", 888).is_some());
    }

    #[test]
    fn aggregated_violations_keep_every_field() {
        let mut violations = Vec::new();
        violations.extend(validate_campaign_name("name", "&&%#($#0#)0  "));
        violations.extend(validate_accessibility("accessibilityInt", 888));
        let err = ensure_valid(violations).unwrap_err();
        match err {
            ApiError::Validation(v) => {
                assert_eq!(v.len(), 2);
                assert_eq!(v[0].field, "name");
                assert_eq!(v[1].field, "accessibilityInt");
            }
            other => panic!("expected validation error, got {other}"),
        }
    }
}
