//! Quarry
//!
//! Semantic analysis and type inference for query expression trees. Every
//! node gets the set of types it may have; problems are collected as
//! diagnostics instead of stopping the analysis.

pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod semantics;
pub mod types;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ast::*;
    pub use crate::diagnostics::{Diagnostic, Severity, Span};
    pub use crate::semantics::{Analysis, Analyzer, SemanticContext, SemanticError};
    pub use crate::types::{CypherType, TypeSpec};
}
