//! Payload validation
//!
//! Every create operation validates its payload before any statement is
//! issued. Failures are reported as a list of field-level errors in the
//! order the fields were checked.

use serde::Serialize;
use std::fmt;

/// Maximum accepted lengths (in characters)
pub const MAX_NAME_LEN: usize = 200;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_PHONE_LEN: usize = 50;
pub const MAX_SHORT_TEXT_LEN: usize = 200;
pub const MAX_MESSAGE_LEN: usize = 5000;

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Collected field errors for one payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a payload with exactly one bad field
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Implemented by every create payload
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Trimmed value, `None` when absent or blank
pub fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Required string: present, non-blank, within `max_len`
pub fn require_text(errors: &mut ValidationErrors, field: &str, value: &Option<String>, max_len: usize) {
    match clean(value) {
        None => errors.push(field, "is required"),
        Some(v) => check_len(errors, field, &v, max_len),
    }
}

/// Optional string: may be absent, null or blank; otherwise within `max_len`
pub fn optional_text(errors: &mut ValidationErrors, field: &str, value: &Option<String>, max_len: usize) {
    if let Some(v) = clean(value) {
        check_len(errors, field, &v, max_len);
    }
}

/// Required email address
pub fn require_email(errors: &mut ValidationErrors, field: &str, value: &Option<String>) {
    match clean(value) {
        None => errors.push(field, "is required"),
        Some(v) => check_email(errors, field, &v),
    }
}

/// Optional email address, checked only when given
pub fn optional_email(errors: &mut ValidationErrors, field: &str, value: &Option<String>) {
    if let Some(v) = clean(value) {
        check_email(errors, field, &v);
    }
}

fn check_len(errors: &mut ValidationErrors, field: &str, value: &str, max_len: usize) {
    if value.chars().count() > max_len {
        errors.push(field, format!("must be at most {} characters", max_len));
    }
}

fn check_email(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.chars().count() > MAX_EMAIL_LEN {
        errors.push(field, format!("must be at most {} characters", MAX_EMAIL_LEN));
    } else if !is_valid_email(value) {
        errors.push(field, "must be a valid email address");
    }
}

/// Shape check only: `local@domain.tld`, no whitespace, a single `@`
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !domain.starts_with('.'),
        None => false,
    }
}
