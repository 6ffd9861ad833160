//! Diagnostics
//!
//! Collects non-fatal findings while a profile is compiled. Fatal problems
//! are [`crate::BindError`]s; everything here lets the run continue.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// A type has no entry in the profile's typemap and was passed through
    UnmappedType,
    /// A feature adds or removes a name the registry never declares
    DanglingReference,
    /// A group lost all its members during pruning
    DroppedGroup,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnmappedType => "W001",
            Self::DanglingReference => "I001",
            Self::DroppedGroup => "I002",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::UnmappedType => Severity::Warning,
            Self::DanglingReference | Self::DroppedGroup => Severity::Info,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Name the finding is about (type, enum, function or group)
    pub subject: String,
    pub code: DiagnosticCode,
    pub message: String,
    /// Additional context, e.g. where the subject was used
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(subject: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.subject
        )?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from one profile's pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: DiagnosticItem) {
        self.items.push(item);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// Record a type that could not be mapped, once per base name
    pub fn unmapped_type(&mut self, type_name: &str, used_by: &str) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.code == DiagnosticCode::UnmappedType && item.subject == type_name)
        {
            existing.context.push(format!("used by {}", used_by));
            return;
        }

        self.push(
            DiagnosticItem::new(
                type_name,
                DiagnosticCode::UnmappedType,
                format!("Unable to map type '{}' to a low-level type", type_name),
            )
            .with_context(format!("used by {}", used_by)),
        );
    }

    pub fn dangling_reference(&mut self, name: &str, version: &str) {
        self.push(DiagnosticItem::new(
            name,
            DiagnosticCode::DanglingReference,
            format!("Feature {} references '{}', which the registry does not declare", version, name),
        ));
    }

    pub fn dropped_group(&mut self, group: &str) {
        self.push(DiagnosticItem::new(
            group,
            DiagnosticCode::DroppedGroup,
            format!("Group '{}' has no surviving members", group),
        ));
    }

    pub fn items(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |item| item.code == code)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items
            .iter()
            .filter(|item| item.severity() == Severity::Warning)
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{}", item)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_type_recorded_once() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.unmapped_type("GLhandleARB", "glDeleteObjectARB");
        diagnostics.unmapped_type("GLhandleARB", "glGetHandleARB");
        diagnostics.unmapped_type("GLsync", "glFenceSync");

        assert_eq!(diagnostics.len(), 2);
        let handle = diagnostics
            .with_code(DiagnosticCode::UnmappedType)
            .find(|item| item.subject == "GLhandleARB")
            .unwrap();
        assert_eq!(handle.context.len(), 2);
        assert!(diagnostics.has_warnings());
    }

    #[test]
    fn test_info_items_are_not_warnings() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.dropped_group("Unused");
        diagnostics.dangling_reference("GL_NOPE", "1.0");

        assert_eq!(diagnostics.len(), 2);
        assert!(!diagnostics.has_warnings());
    }

    #[test]
    fn test_display() {
        let item = DiagnosticItem::new("GLsync", DiagnosticCode::UnmappedType, "no mapping")
            .with_context("used by glFenceSync");
        assert_eq!(
            item.to_string(),
            "[W001] warning: no mapping (GLsync)\n  - used by glFenceSync"
        );
    }
}
