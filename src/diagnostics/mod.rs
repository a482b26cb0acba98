//! Diagnostic reporting for Quarry
//!
//! Semantic errors found during analysis are rendered as diagnostics with
//! stable error codes, source spans, and machine-readable JSON output.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod error_codes;
pub use error_codes::*;

/// A source location inside the query text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (0-indexed)
    pub start: usize,

    /// End byte offset (0-indexed, exclusive)
    pub end: usize,

    /// Line of the start offset (1-indexed)
    pub line: usize,

    /// Column of the start offset (1-indexed)
    pub column: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Span used for nodes that carry no position (synthesized or hand-built)
    pub fn unknown() -> Self {
        Self::new(0, 0, 1, 1)
    }

    /// Number of bytes covered
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no bytes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// An additional note attached to a diagnostic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Note message
    pub message: String,
}

impl Note {
    /// Create a new note with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A diagnostic produced while analyzing a query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable error code (e.g., "E1001")
    pub code: String,

    /// Severity level
    pub severity: Severity,

    /// Primary message
    pub message: String,

    /// Primary source span
    pub span: Span,

    /// Input the diagnostic was reported against, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Additional notes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(code.into(), Severity::Error)
    }

    /// Create a new warning diagnostic
    pub fn warning(code: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(code.into(), Severity::Warning)
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// Format as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format as human-readable string. The caret underline is only drawn
    /// when the query text is available.
    pub fn to_human_readable(&self, source: Option<&str>) -> String {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        let location = self
            .file
            .as_ref()
            .map(|f| f.display().to_string())
            .unwrap_or_else(|| "<query>".to_string());

        let mut output = format!(
            "{}[{}]: {}\n  --> {}:{}:{}\n",
            severity, self.code, self.message, location, self.span.line, self.span.column
        );

        if let Some(line) = source.and_then(|s| s.lines().nth(self.span.line.saturating_sub(1))) {
            output.push_str(&format!("   |\n{:>3} | {}\n   |", self.span.line, line));

            let underline_start = self.span.column.saturating_sub(1);
            let underline_len = self
                .span
                .len()
                .min(line.len().saturating_sub(underline_start))
                .max(1);

            output.push_str(&format!(
                " {}{}\n",
                " ".repeat(underline_start),
                "^".repeat(underline_len)
            ));
        }

        for note in &self.notes {
            output.push_str(&format!("   = note: {}\n", note.message));
        }

        output
    }
}

/// Builder for constructing diagnostics
pub struct DiagnosticBuilder {
    code: String,
    severity: Severity,
    message: String,
    span: Option<Span>,
    file: Option<PathBuf>,
    notes: Vec<Note>,
}

impl DiagnosticBuilder {
    fn new(code: String, severity: Severity) -> Self {
        Self {
            code,
            severity,
            message: String::new(),
            span: None,
            file: None,
            notes: Vec::new(),
        }
    }

    /// Set the message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the primary span
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Set the input file
    pub fn file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Add a note
    pub fn note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }

    /// Build the diagnostic
    pub fn build(self) -> Diagnostic {
        Diagnostic {
            code: self.code,
            severity: self.severity,
            message: self.message,
            span: self.span.unwrap_or_default(),
            file: self.file,
            notes: self.notes,
        }
    }
}

/// A collection of diagnostics
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    /// Create a new empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    /// Count warnings
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
            .count()
    }

    /// Count errors
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Get all diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Merge another bag into this one
    pub fn merge(&mut self, other: DiagnosticBag) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Get the number of diagnostics
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Check if the bag is empty
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Format all diagnostics as a JSON array
    pub fn to_json(&self) -> String {
        let json_array: Vec<String> = self.diagnostics.iter().map(|d| d.to_json()).collect();
        format!("[{}]", json_array.join(","))
    }

    /// Format all diagnostics as human-readable text
    pub fn format_text(&self, source: Option<&str>) -> String {
        self.diagnostics
            .iter()
            .map(|d| d.to_human_readable(source))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Diagnostic> for DiagnosticBag {
    fn from(diagnostic: Diagnostic) -> Self {
        let mut bag = DiagnosticBag::new();
        bag.push(diagnostic);
        bag
    }
}

impl FromIterator<Diagnostic> for DiagnosticBag {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self {
            diagnostics: iter.into_iter().collect(),
        }
    }
}
