use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::CvFields;

/// Field name -> human readable message.
pub type FieldErrors = BTreeMap<String, String>;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_ROLE_LEN: usize = 2;
pub const MIN_PHONE_LEN: usize = 5;
pub const MIN_LOCATION_LEN: usize = 2;
pub const MIN_SUMMARY_LEN: usize = 50;

/// Users are keyed by email, so every lookup goes through this.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Check every field of a CV form. All failures are collected, not just the first.
pub fn validate_cv(fields: &CvFields) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    check_min_len(&mut errors, "name", &fields.name, MIN_NAME_LEN, "Name");
    check_min_len(&mut errors, "role", &fields.role, MIN_ROLE_LEN, "Role");
    check_min_len(&mut errors, "phone", &fields.phone, MIN_PHONE_LEN, "Phone number");
    check_min_len(&mut errors, "location", &fields.location, MIN_LOCATION_LEN, "Location");
    check_min_len(&mut errors, "summary", &fields.summary, MIN_SUMMARY_LEN, "Summary");

    if fields.email.trim().is_empty() {
        errors.insert("email".to_string(), "Email is required".to_string());
    } else if !is_valid_email(&fields.email) {
        errors.insert("email".to_string(), "Invalid email address".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_min_len(errors: &mut FieldErrors, field: &str, value: &str, min: usize, label: &str) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.insert(field.to_string(), format!("{label} is required"));
    } else if len < min {
        errors.insert(
            field.to_string(),
            format!("{label} must be at least {min} characters"),
        );
    }
}
