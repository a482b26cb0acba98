//! Semantic analysis of expression trees
//!
//! Checks are built per node and run against an immutable
//! [`SemanticState`]. Every node ends up with a set of possible types, and
//! every problem found along the way is reported as a [`SemanticError`]
//! without stopping the analysis.

mod analysis;
mod check;
mod dependencies;
mod error;
mod expressions;
pub mod functions;
mod operators;
mod state;
mod typing;

pub use analysis::{Analysis, Analyzer};
pub use check::{
    expect_type, expect_type_with, fold_semantic_check, specify_type, CheckResult, SemanticCheck,
};
pub use dependencies::dependencies;
pub use error::SemanticError;
pub use state::{ExpressionTypeInfo, SemanticState, Symbol};
pub use typing::{check_signatures, function_typing, simple_typing, Signature};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an expression appears. Aggregating functions are only allowed in
/// result projections.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SemanticContext {
    #[default]
    Simple,
    Results,
}

impl fmt::Display for SemanticContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticContext::Simple => write!(f, "simple"),
            SemanticContext::Results => write!(f, "results"),
        }
    }
}

#[cfg(test)]
mod tests;
