// File: src/result.rs
// Purpose: Outcome of a server-side validation pass

use std::collections::BTreeMap;

/// Classification tag attached to rule failures
pub const VALIDATION: &str = "validation";

/// One failed rule (or framework-level field check)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub kind: &'static str,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind: VALIDATION,
        }
    }
}

/// Result of validation with errors, in the order they were recorded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    /// Set by checks that fail without recording a message
    failed: bool,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn success() -> Self {
        Self::default()
    }

    /// Record a failure for a field
    pub fn validation_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError::new(field, message));
    }

    /// Mark the result failed without attaching a message to any field
    pub fn fail(&mut self) {
        self.failed = true;
    }

    pub fn is_valid(&self) -> bool {
        !self.failed && self.errors.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all messages for a specific field
    pub fn errors_for(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// Get first error for a specific field
    pub fn first_error(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Field name -> messages, the shape form renderers usually want
    pub fn into_field_map(self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for error in self.errors {
            map.entry(error.field).or_default().push(error.message);
        }
        map
    }
}
