//! Validation diagnostics collected during reversal.
//!
//! Validation errors are non-fatal: they flag probably-wrong layouts a
//! maintainer should review, output generation still completes, and the
//! process exit code reflects whether any were collected.

use serde::Serialize;

/// Accumulated validation diagnostics for a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Collected errors, in detection order.
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// Creates a new empty validation report.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Returns true if no validation error was collected.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Adds an error to the report.
    pub fn add(&mut self, kind: ValidationErrorKind, message: impl Into<String>) {
        self.errors.push(ValidationError {
            kind,
            message: message.into(),
        });
    }

    /// Formats the report as a user-friendly error list.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut message = format!("{} error(s):\n", self.errors.len());
        for error in &self.errors {
            message.push_str(&format!("{error}\n"));
        }
        message
    }
}

/// One validation error with its message.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    /// Type of validation error.
    pub kind: ValidationErrorKind,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Types of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// An action key appeared under a non-empty modifier combination.
    ActionWithModifier,
    /// An action key's scancode differs from its canonical scancode.
    ActionScancodeMismatch,
    /// A virtual key outside every known table appeared in a context that
    /// should produce output.
    UnknownKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_valid() {
        assert!(ValidationReport::new().is_valid());
    }

    #[test]
    fn test_format_message_lists_errors() {
        let mut report = ValidationReport::new();
        report.add(ValidationErrorKind::UnknownKey, "Unknown VK_X in Test");
        report.add(
            ValidationErrorKind::ActionWithModifier,
            "Action key with control key",
        );
        let message = report.format_message();
        assert!(message.starts_with("2 error(s):"));
        assert!(message.contains("Unknown VK_X in Test"));
    }
}
