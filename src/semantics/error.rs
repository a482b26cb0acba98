//! Semantic errors recorded during analysis

use crate::diagnostics::{semantic, Diagnostic, Note, Span};
use crate::types::TypeSpec;
use std::path::Path;
use thiserror::Error;

/// A recoverable problem found while checking an expression. Errors never
/// stop the analysis; they are collected in order of discovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SemanticError {
    pub code: &'static str,
    pub message: String,
    pub span: Span,
}

impl SemanticError {
    pub fn new(code: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            span,
        }
    }

    /// The default mismatch message
    pub fn type_mismatch(expected: &TypeSpec, actual: &TypeSpec, span: Span) -> Self {
        Self::new(
            semantic::TYPE_MISMATCH,
            type_mismatch_message(expected, actual),
            span,
        )
    }

    /// Render as a diagnostic, optionally attributed to an input file
    pub fn to_diagnostic(&self, file: Option<&Path>) -> Diagnostic {
        let mut builder = Diagnostic::error(self.code)
            .message(self.message.clone())
            .span(self.span);
        if let Some(file) = file {
            builder = builder.file(file);
        }
        if self.code == semantic::INVALID_AGGREGATION {
            builder = builder.note(Note::new(
                "aggregating functions are only allowed in result projections",
            ));
        }
        builder.build()
    }
}

pub fn type_mismatch_message(expected: &TypeSpec, actual: &TypeSpec) -> String {
    format!("Type mismatch: expected {} but was {}", expected, actual)
}
