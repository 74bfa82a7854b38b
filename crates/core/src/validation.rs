//! Field-level form validation errors.
//!
//! Validation failures are local to a form field: each [`FieldError`] names
//! the field it belongs to so the view can render the message next to it.
//! Any error blocks submission.

use core::fmt;

/// A validation failure tied to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field name (matches the HTML `name` attribute).
    pub field: &'static str,
    /// Human-readable message.
    pub message: String,
}

/// All validation failures for one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl std::error::Error for ValidationErrors {}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "validation failed: {}", parts.join("; "))
    }
}

impl ValidationErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record a failure for `field`. Only the first message per field is kept.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        if self.field(field).is_none() {
            self.errors.push(FieldError {
                field,
                message: message.into(),
            });
        }
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// `Ok(value)` when nothing failed, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Require a non-blank value.
pub(crate) fn require(errors: &mut ValidationErrors, field: &'static str, value: &str, label: &str) {
    if value.trim().is_empty() {
        errors.add(field, format!("{label} is required"));
    }
}

/// Validate login credentials: both fields are required.
///
/// # Errors
///
/// Returns the field errors when either value is blank.
pub fn validate_login(username: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    require(&mut errors, "username", username, "Username");
    require(&mut errors, "password", password, "Password");
    errors.finish(())
}
