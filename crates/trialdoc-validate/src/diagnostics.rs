//! Validation diagnostics
//!
//! Each diagnostic carries a severity, a stable code and the dotted path of
//! the offending node (e.g. `sections[2].content_blocks[1]`).

use serde::{Deserialize, Serialize};

/// A validation finding
///
/// # Example
///
/// ```
/// use trialdoc_validate::diagnostics::{Diagnostic, Severity};
///
/// let diag = Diagnostic::error("Section ID is required")
///     .with_code("UIF110")
///     .with_path("sections[0]");
///
/// assert_eq!(diag.severity, Severity::Error);
/// assert_eq!(diag.render_message(), "sections[0]: Section ID is required");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,

    /// The diagnostic message, without the path prefix
    pub message: String,

    /// Stable code (e.g., "UIF110")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Dotted path of the offending node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Optional file the tree was loaded from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Additional help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Potential issue; does not fail validation
    Warning,

    /// Violation; fails validation
    Error,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            code: None,
            path: None,
            file: None,
            help: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Set the diagnostic code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the node path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the file path
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Check if this is an error-level diagnostic
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// Check if this is a warning-level diagnostic
    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }

    /// Message with its path prefix, as reported to callers
    pub fn render_message(&self) -> String {
        match &self.path {
            Some(path) => format!("{}: {}", path, self.message),
            None => self.message.clone(),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: severity[code]: path: message
        write!(f, "{}", self.severity)?;
        if let Some(ref code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.render_message())?;

        if let Some(ref file) = self.file {
            write!(f, "\n  --> {}", file)?;
        }

        if let Some(ref help) = self.help {
            write!(f, "\n  = help: {}", help)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_code_and_path() {
        let diag = Diagnostic::error("Table must have headers or rows")
            .with_code("UIF122")
            .with_path("sections[0].content_blocks[2]");
        assert_eq!(
            diag.to_string(),
            "error[UIF122]: sections[0].content_blocks[2]: Table must have headers or rows"
        );
    }

    #[test]
    fn test_display_with_file_and_help() {
        let diag = Diagnostic::warning("Duplicate section id 'intro'")
            .with_file("consent.json")
            .with_help("Section ids must be unique");
        let text = diag.to_string();
        assert!(text.starts_with("warning: Duplicate"));
        assert!(text.contains("--> consent.json"));
        assert!(text.contains("= help: Section ids must be unique"));
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let diag = Diagnostic::error("Document title is required").with_code("UIF101");
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["severity"], "error");
        assert!(json.get("path").is_none());
        assert!(json.get("help").is_none());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }
}
