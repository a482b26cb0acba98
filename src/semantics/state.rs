//! The immutable analysis state
//!
//! Every operation returns a new `SemanticState`; the persistent maps make
//! each snapshot cheap to keep around.

use super::error::{type_mismatch_message, SemanticError};
use crate::ast::{Binding, Expr, NodeId};
use crate::diagnostics::{semantic, Span};
use crate::types::TypeSpec;
use im::{HashMap as ImHashMap, Vector as ImVector};

/// What is known about one expression node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionTypeInfo {
    /// Types the node itself was specified to have
    pub specified: TypeSpec,
    /// Types the node's position accepts, if constrained
    pub expected: Option<TypeSpec>,
}

impl ExpressionTypeInfo {
    pub fn new(specified: TypeSpec) -> Self {
        Self {
            specified,
            expected: None,
        }
    }

    /// The specified types narrowed by the expectation
    pub fn actual(&self) -> TypeSpec {
        match &self.expected {
            Some(expected) => self.specified.intersect(expected),
            None => self.specified.clone(),
        }
    }

    fn with_expectation(&self, possible: &TypeSpec) -> Self {
        let expected = match &self.expected {
            Some(previous) => previous.intersect(possible),
            None => possible.clone(),
        };
        Self {
            specified: self.specified.clone(),
            expected: Some(expected),
        }
    }
}

/// A declared identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub types: TypeSpec,
    /// Node that introduced the name
    pub binding: NodeId,
    pub definition: Span,
}

type Scope = ImHashMap<String, Symbol>;

/// Everything learned so far about one query
#[derive(Debug, Clone)]
pub struct SemanticState {
    type_table: ImHashMap<NodeId, ExpressionTypeInfo>,
    /// Innermost scope last; the root scope is never popped
    scopes: ImVector<Scope>,
    /// Variable reference -> the binding it resolved to
    references: ImHashMap<NodeId, NodeId>,
    revision: u64,
}

impl Default for SemanticState {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticState {
    /// Fresh state with an empty root scope
    pub fn new() -> Self {
        Self {
            type_table: ImHashMap::new(),
            scopes: ImVector::unit(Scope::new()),
            references: ImHashMap::new(),
            revision: 0,
        }
    }

    fn next(mut self) -> Self {
        self.revision += 1;
        self
    }

    /// Number of states derived before this one
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn expression_type(&self, id: NodeId) -> Option<&ExpressionTypeInfo> {
        self.type_table.get(&id)
    }

    /// Actual types of an expression; unchecked expressions may be anything
    pub fn types(&self, expr: &Expr) -> TypeSpec {
        self.types_of(expr.id())
    }

    pub fn types_of(&self, id: NodeId) -> TypeSpec {
        self.type_table
            .get(&id)
            .map(ExpressionTypeInfo::actual)
            .unwrap_or_else(TypeSpec::all)
    }

    /// Record that `expr` has one of `possible`. A node specified before is
    /// narrowed; if nothing is left the respecification is an error.
    pub fn specify_type(&self, expr: &Expr, possible: TypeSpec) -> Result<Self, SemanticError> {
        self.specify_node(expr.id(), expr.span(), possible)
    }

    fn specify_node(&self, id: NodeId, span: Span, possible: TypeSpec) -> Result<Self, SemanticError> {
        let info = match self.type_table.get(&id) {
            Some(existing) => {
                let narrowed = existing.specified.intersect(&possible);
                if narrowed.is_empty() {
                    return Err(SemanticError::new(
                        semantic::RESPECIFIED_TYPE,
                        type_mismatch_message(&possible, &existing.specified),
                        span,
                    ));
                }
                ExpressionTypeInfo {
                    specified: narrowed,
                    expected: existing.expected.clone(),
                }
            }
            None => ExpressionTypeInfo::new(possible),
        };
        let mut state = self.clone();
        state.type_table = state.type_table.update(id, info);
        Ok(state.next())
    }

    /// Record that the position of `expr` accepts `possible`, returning the
    /// new state and the node's resulting actual types.
    pub fn expect_type(&self, expr: &Expr, possible: &TypeSpec) -> (Self, TypeSpec) {
        let info = self
            .type_table
            .get(&expr.id())
            .cloned()
            .unwrap_or_else(|| ExpressionTypeInfo::new(TypeSpec::all()))
            .with_expectation(possible);
        let actual = info.actual();
        let mut state = self.clone();
        state.type_table = state.type_table.update(expr.id(), info);
        (state.next(), actual)
    }

    /// Declare a name in the innermost scope
    pub fn declare_variable(&self, binding: &Binding, types: TypeSpec) -> Result<Self, SemanticError> {
        let scope = self.scopes.back().cloned().unwrap_or_default();
        if let Some(existing) = scope.get(&binding.name) {
            return Err(SemanticError::new(
                semantic::VARIABLE_ALREADY_DECLARED,
                format!(
                    "Variable `{}` already declared at {}:{}",
                    binding.name, existing.definition.line, existing.definition.column
                ),
                binding.span,
            ));
        }
        let symbol = Symbol {
            name: binding.name.clone(),
            types: types.clone(),
            binding: binding.id,
            definition: binding.span,
        };
        let mut state = self.specify_node(binding.id, binding.span, types)?;
        let depth = state.scopes.len();
        state
            .scopes
            .set(depth - 1, scope.update(binding.name.clone(), symbol));
        Ok(state)
    }

    /// Resolve a variable reference: the reference is recorded and the node is
    /// specified with the symbol's types.
    pub fn ensure_variable_defined(&self, name: &str, reference: &Expr) -> Result<Self, SemanticError> {
        let symbol = self.symbol(name).ok_or_else(|| {
            SemanticError::new(
                semantic::UNDEFINED_VARIABLE,
                format!("Variable `{}` not defined", name),
                reference.span(),
            )
        })?;
        let mut state = self.specify_type(reference, symbol.types.clone())?;
        state.references = state.references.update(reference.id(), symbol.binding);
        Ok(state)
    }

    /// Innermost visible declaration of `name`
    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Declarations of the root scope, sorted by name
    pub fn root_symbols(&self) -> Vec<&Symbol> {
        let mut symbols: Vec<&Symbol> = self
            .scopes
            .front()
            .map(|scope| scope.values().collect())
            .unwrap_or_default();
        symbols.sort_by(|a, b| a.name.cmp(&b.name));
        symbols
    }

    /// The binding a variable reference resolved to
    pub fn binding_of(&self, reference: NodeId) -> Option<NodeId> {
        self.references.get(&reference).copied()
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push_scope(&self) -> Self {
        let mut state = self.clone();
        state.scopes.push_back(Scope::new());
        state.next()
    }

    pub fn pop_scope(&self) -> Self {
        let mut state = self.clone();
        if state.scopes.len() > 1 {
            state.scopes.pop_back();
        }
        state.next()
    }
}
