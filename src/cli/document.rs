//! Query documents read by the CLI

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::CliError;
use crate::ast::Expr;
use crate::config::DeclaredType;

/// A JSON file holding expressions to analyse
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryDocument {
    /// Query text the spans point into
    #[serde(default)]
    pub source: Option<String>,

    /// Variables in scope for every expression of this document
    #[serde(default)]
    pub variables: BTreeMap<String, DeclaredType>,

    pub expressions: Vec<Expr>,
}

impl QueryDocument {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| CliError::InvalidDocument {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let mut document: Self = serde_json::from_str(content)?;
        for (index, expr) in document.expressions.iter_mut().enumerate() {
            if expr.ensure_unique_ids() {
                tracing::debug!(index, "renumbered expression with duplicate node ids");
            }
        }
        Ok(document)
    }
}
