//! Entry point for analysing a whole expression

use super::dependencies::dependencies;
use super::error::SemanticError;
use super::state::{SemanticState, Symbol};
use super::SemanticContext;
use crate::ast::{Binding, Expr, NodeId};
use crate::config::Config;
use crate::diagnostics::DiagnosticBag;
use crate::types::TypeSpec;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Holds the environment expressions are analysed in
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    base: SemanticState,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the configured variables
    pub fn from_config(config: &Config) -> Result<Self, SemanticError> {
        config
            .variables
            .iter()
            .try_fold(Self::new(), |analyzer, (name, declared)| {
                analyzer.declare(name, declared.to_spec())
            })
    }

    /// Declare a variable visible to every analysed expression
    pub fn declare(mut self, name: &str, types: TypeSpec) -> Result<Self, SemanticError> {
        self.base = self.base.declare_variable(&Binding::new(name), types)?;
        Ok(self)
    }

    pub fn state(&self) -> &SemanticState {
        &self.base
    }

    /// Check `expr` against the declared environment
    #[tracing::instrument(level = "debug", skip_all, fields(root = expr.id().0, context = %ctx))]
    pub fn analyze<'e>(&self, expr: &'e Expr, ctx: SemanticContext) -> Analysis<'e> {
        let result = expr.semantic_check(ctx).run(self.base.clone());
        tracing::debug!(errors = result.errors.len(), "analysis finished");
        Analysis {
            root: expr,
            state: result.state,
            errors: result.errors,
        }
    }
}

/// Outcome of analysing one expression
#[derive(Debug, Clone)]
pub struct Analysis<'e> {
    pub root: &'e Expr,
    pub state: SemanticState,
    pub errors: Vec<SemanticError>,
}

impl<'e> Analysis<'e> {
    pub fn is_well_typed(&self) -> bool {
        self.errors.is_empty()
    }

    /// Actual types of any node of the analysed tree
    pub fn type_of(&self, expr: &Expr) -> TypeSpec {
        self.state.types(expr)
    }

    /// Root-scope declaration of `name`
    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.state.symbol(name)
    }

    pub fn root_type(&self) -> TypeSpec {
        self.type_of(self.root)
    }

    /// Actual types of the root and every descendant
    pub fn types_for_subtree(&self) -> BTreeMap<NodeId, TypeSpec> {
        std::iter::once(self.root)
            .chain(self.root.descendants())
            .map(|node| (node.id(), self.state.types(node)))
            .collect()
    }

    pub fn dependencies(&self) -> BTreeSet<String> {
        dependencies(self.root)
    }

    pub fn diagnostics(&self, file: Option<&Path>) -> DiagnosticBag {
        self.errors
            .iter()
            .map(|error| error.to_diagnostic(file))
            .collect()
    }
}
