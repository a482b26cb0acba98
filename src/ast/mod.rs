//! Expression tree definitions
//!
//! Trees arrive fully formed from the parser (or as JSON through the CLI) and
//! are never mutated by the analyzer. All expression nodes include:
//! - Unique node ID
//! - Source span
//! - Node-specific data

mod fold;

pub use fold::fold;

use crate::diagnostics::Span;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for expression nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Generate a new unique node ID
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A name introduced by a filtering expression (`x` in `any(x IN list ...)`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binding {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub span: Span,
    pub name: String,
}

impl Binding {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            span: Span::unknown(),
            name: name.into(),
        }
    }
}

/// Expression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expr {
    // Literals
    IntegerLit {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        value: i64,
    },
    FloatLit {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        value: f64,
    },
    StringLit {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        value: String,
    },
    BoolLit {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        value: bool,
    },
    NullLit {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
    },
    ListLit {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        items: Vec<Expr>,
    },

    // Names
    Variable {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        name: String,
    },
    Parameter {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        name: String,
    },
    Property {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        map: Box<Expr>,
        key: String,
    },

    // Operations
    Prefix {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        op: PrefixOp,
        operand: Box<Expr>,
    },
    Postfix {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        op: PostfixOp,
        operand: Box<Expr>,
    },
    Infix {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        op: InfixOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    FunctionCall {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        name: String,
        #[serde(default)]
        distinct: bool,
        args: Vec<Expr>,
    },
    CountStar {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
    },

    // Filtering expressions
    /// `[x IN list WHERE predicate | projection]`
    ListComprehension {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        variable: Binding,
        list: Box<Expr>,
        #[serde(default)]
        predicate: Option<Box<Expr>>,
        #[serde(default)]
        projection: Option<Box<Expr>>,
    },
    /// `any(x IN list WHERE predicate)` and friends
    IterablePredicate {
        #[serde(default)]
        id: NodeId,
        #[serde(default)]
        span: Span,
        kind: PredicateKind,
        variable: Binding,
        list: Box<Expr>,
        #[serde(default)]
        predicate: Option<Box<Expr>>,
    },
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefixOp {
    Not,
    Negate,
    Plus,
}

/// Postfix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostfixOp {
    IsNull,
    IsNotNull,
}

/// Infix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfixOp {
    // Logical
    And,
    Or,
    Xor,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    // Membership and string matching
    In,
    StartsWith,
    EndsWith,
    Contains,
}

/// Quantifier of an iterable predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredicateKind {
    Any,
    All,
    None,
    Single,
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrefixOp::Not => "NOT",
            PrefixOp::Negate => "-",
            PrefixOp::Plus => "+",
        })
    }
}

impl fmt::Display for PostfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PostfixOp::IsNull => "IS NULL",
            PostfixOp::IsNotNull => "IS NOT NULL",
        })
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InfixOp::And => "AND",
            InfixOp::Or => "OR",
            InfixOp::Xor => "XOR",
            InfixOp::Eq => "=",
            InfixOp::NotEq => "<>",
            InfixOp::Lt => "<",
            InfixOp::LtEq => "<=",
            InfixOp::Gt => ">",
            InfixOp::GtEq => ">=",
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Mod => "%",
            InfixOp::Pow => "^",
            InfixOp::In => "IN",
            InfixOp::StartsWith => "STARTS WITH",
            InfixOp::EndsWith => "ENDS WITH",
            InfixOp::Contains => "CONTAINS",
        })
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PredicateKind::Any => "any",
            PredicateKind::All => "all",
            PredicateKind::None => "none",
            PredicateKind::Single => "single",
        })
    }
}

impl Expr {
    /// The node's identity
    pub fn id(&self) -> NodeId {
        match self {
            Expr::IntegerLit { id, .. }
            | Expr::FloatLit { id, .. }
            | Expr::StringLit { id, .. }
            | Expr::BoolLit { id, .. }
            | Expr::NullLit { id, .. }
            | Expr::ListLit { id, .. }
            | Expr::Variable { id, .. }
            | Expr::Parameter { id, .. }
            | Expr::Property { id, .. }
            | Expr::Prefix { id, .. }
            | Expr::Postfix { id, .. }
            | Expr::Infix { id, .. }
            | Expr::FunctionCall { id, .. }
            | Expr::CountStar { id, .. }
            | Expr::ListComprehension { id, .. }
            | Expr::IterablePredicate { id, .. } => *id,
        }
    }

    /// The node's source position
    pub fn span(&self) -> Span {
        match self {
            Expr::IntegerLit { span, .. }
            | Expr::FloatLit { span, .. }
            | Expr::StringLit { span, .. }
            | Expr::BoolLit { span, .. }
            | Expr::NullLit { span, .. }
            | Expr::ListLit { span, .. }
            | Expr::Variable { span, .. }
            | Expr::Parameter { span, .. }
            | Expr::Property { span, .. }
            | Expr::Prefix { span, .. }
            | Expr::Postfix { span, .. }
            | Expr::Infix { span, .. }
            | Expr::FunctionCall { span, .. }
            | Expr::CountStar { span, .. }
            | Expr::ListComprehension { span, .. }
            | Expr::IterablePredicate { span, .. } => *span,
        }
    }

    /// Replace the node's span
    pub fn with_span(mut self, new_span: Span) -> Self {
        match &mut self {
            Expr::IntegerLit { span, .. }
            | Expr::FloatLit { span, .. }
            | Expr::StringLit { span, .. }
            | Expr::BoolLit { span, .. }
            | Expr::NullLit { span, .. }
            | Expr::ListLit { span, .. }
            | Expr::Variable { span, .. }
            | Expr::Parameter { span, .. }
            | Expr::Property { span, .. }
            | Expr::Prefix { span, .. }
            | Expr::Postfix { span, .. }
            | Expr::Infix { span, .. }
            | Expr::FunctionCall { span, .. }
            | Expr::CountStar { span, .. }
            | Expr::ListComprehension { span, .. }
            | Expr::IterablePredicate { span, .. } => *span = new_span,
        }
        self
    }

    /// Direct subexpressions in left-to-right source order
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::IntegerLit { .. }
            | Expr::FloatLit { .. }
            | Expr::StringLit { .. }
            | Expr::BoolLit { .. }
            | Expr::NullLit { .. }
            | Expr::Variable { .. }
            | Expr::Parameter { .. }
            | Expr::CountStar { .. } => Vec::new(),
            Expr::ListLit { items, .. } => items.iter().collect(),
            Expr::Property { map, .. } => vec![map.as_ref()],
            Expr::Prefix { operand, .. } | Expr::Postfix { operand, .. } => vec![operand.as_ref()],
            Expr::Infix { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::FunctionCall { args, .. } => args.iter().collect(),
            Expr::ListComprehension {
                list,
                predicate,
                projection,
                ..
            } => std::iter::once(list.as_ref())
                .chain(predicate.as_deref())
                .chain(projection.as_deref())
                .collect(),
            Expr::IterablePredicate {
                list, predicate, ..
            } => std::iter::once(list.as_ref())
                .chain(predicate.as_deref())
                .collect(),
        }
    }

    /// The name bound by a filtering expression
    pub fn bound_variable(&self) -> Option<&Binding> {
        match self {
            Expr::ListComprehension { variable, .. } | Expr::IterablePredicate { variable, .. } => {
                Some(variable)
            }
            _ => None,
        }
    }

    /// Fold over this tree; see [`fold`]
    pub fn tree_fold<'a, A, F>(&'a self, init: A, visitor: F) -> A
    where
        F: Fn(&'a Expr, A, &dyn Fn(A) -> A) -> A,
    {
        fold(self, init, &visitor)
    }

    /// Every node strictly below this one, in pre-order
    pub fn descendants(&self) -> Vec<&Expr> {
        self.tree_fold(Vec::new(), |node, mut acc, children| {
            if !std::ptr::eq(node, self) {
                acc.push(node);
            }
            children(acc)
        })
    }

    /// Ids of every node and binding in the tree, in pre-order
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.tree_fold(Vec::new(), |node, mut acc, children| {
            acc.push(node.id());
            acc.extend(node.bound_variable().map(|binding| binding.id));
            children(acc)
        })
    }

    /// Renumber the whole tree from 1 if any two nodes or bindings share an
    /// id. Trees read from JSON may mix explicit ids with generated ones.
    ///
    /// Returns whether the tree was renumbered.
    pub fn ensure_unique_ids(&mut self) -> bool {
        let mut seen = HashSet::new();
        if self.node_ids().into_iter().all(|id| seen.insert(id)) {
            return false;
        }
        let mut next = 1;
        self.renumber(&mut next);
        true
    }

    fn renumber(&mut self, next: &mut u64) {
        *self.id_mut() = NodeId(*next);
        *next += 1;
        if let Expr::ListComprehension { variable, .. } | Expr::IterablePredicate { variable, .. } =
            self
        {
            variable.id = NodeId(*next);
            *next += 1;
        }
        for child in self.children_mut() {
            child.renumber(next);
        }
    }

    fn id_mut(&mut self) -> &mut NodeId {
        match self {
            Expr::IntegerLit { id, .. }
            | Expr::FloatLit { id, .. }
            | Expr::StringLit { id, .. }
            | Expr::BoolLit { id, .. }
            | Expr::NullLit { id, .. }
            | Expr::ListLit { id, .. }
            | Expr::Variable { id, .. }
            | Expr::Parameter { id, .. }
            | Expr::Property { id, .. }
            | Expr::Prefix { id, .. }
            | Expr::Postfix { id, .. }
            | Expr::Infix { id, .. }
            | Expr::FunctionCall { id, .. }
            | Expr::CountStar { id, .. }
            | Expr::ListComprehension { id, .. }
            | Expr::IterablePredicate { id, .. } => id,
        }
    }

    fn children_mut(&mut self) -> Vec<&mut Expr> {
        match self {
            Expr::IntegerLit { .. }
            | Expr::FloatLit { .. }
            | Expr::StringLit { .. }
            | Expr::BoolLit { .. }
            | Expr::NullLit { .. }
            | Expr::Variable { .. }
            | Expr::Parameter { .. }
            | Expr::CountStar { .. } => Vec::new(),
            Expr::ListLit { items, .. } | Expr::FunctionCall { args: items, .. } => {
                items.iter_mut().collect()
            }
            Expr::Property { map, .. } => vec![map.as_mut()],
            Expr::Prefix { operand, .. } | Expr::Postfix { operand, .. } => vec![operand.as_mut()],
            Expr::Infix { lhs, rhs, .. } => vec![lhs.as_mut(), rhs.as_mut()],
            Expr::ListComprehension {
                list,
                predicate,
                projection,
                ..
            } => std::iter::once(list.as_mut())
                .chain(predicate.as_deref_mut())
                .chain(projection.as_deref_mut())
                .collect(),
            Expr::IterablePredicate {
                list, predicate, ..
            } => std::iter::once(list.as_mut())
                .chain(predicate.as_deref_mut())
                .collect(),
        }
    }

    // Constructors for hand-built trees

    pub fn integer(value: i64) -> Self {
        Expr::IntegerLit {
            id: NodeId::new(),
            span: Span::unknown(),
            value,
        }
    }

    pub fn float(value: f64) -> Self {
        Expr::FloatLit {
            id: NodeId::new(),
            span: Span::unknown(),
            value,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::StringLit {
            id: NodeId::new(),
            span: Span::unknown(),
            value: value.into(),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Expr::BoolLit {
            id: NodeId::new(),
            span: Span::unknown(),
            value,
        }
    }

    pub fn null() -> Self {
        Expr::NullLit {
            id: NodeId::new(),
            span: Span::unknown(),
        }
    }

    pub fn list(items: Vec<Expr>) -> Self {
        Expr::ListLit {
            id: NodeId::new(),
            span: Span::unknown(),
            items,
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable {
            id: NodeId::new(),
            span: Span::unknown(),
            name: name.into(),
        }
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Expr::Parameter {
            id: NodeId::new(),
            span: Span::unknown(),
            name: name.into(),
        }
    }

    pub fn property(map: Expr, key: impl Into<String>) -> Self {
        Expr::Property {
            id: NodeId::new(),
            span: Span::unknown(),
            map: Box::new(map),
            key: key.into(),
        }
    }

    pub fn prefix(op: PrefixOp, operand: Expr) -> Self {
        Expr::Prefix {
            id: NodeId::new(),
            span: Span::unknown(),
            op,
            operand: Box::new(operand),
        }
    }

    pub fn postfix(op: PostfixOp, operand: Expr) -> Self {
        Expr::Postfix {
            id: NodeId::new(),
            span: Span::unknown(),
            op,
            operand: Box::new(operand),
        }
    }

    pub fn infix(op: InfixOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Infix {
            id: NodeId::new(),
            span: Span::unknown(),
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::FunctionCall {
            id: NodeId::new(),
            span: Span::unknown(),
            name: name.into(),
            distinct: false,
            args,
        }
    }

    pub fn call_distinct(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::FunctionCall {
            id: NodeId::new(),
            span: Span::unknown(),
            name: name.into(),
            distinct: true,
            args,
        }
    }

    pub fn count_star() -> Self {
        Expr::CountStar {
            id: NodeId::new(),
            span: Span::unknown(),
        }
    }

    pub fn comprehension(
        variable: impl Into<String>,
        list: Expr,
        predicate: Option<Expr>,
        projection: Option<Expr>,
    ) -> Self {
        Expr::ListComprehension {
            id: NodeId::new(),
            span: Span::unknown(),
            variable: Binding::new(variable),
            list: Box::new(list),
            predicate: predicate.map(Box::new),
            projection: projection.map(Box::new),
        }
    }

    pub fn iterable(
        kind: PredicateKind,
        variable: impl Into<String>,
        list: Expr,
        predicate: Option<Expr>,
    ) -> Self {
        Expr::IterablePredicate {
            id: NodeId::new(),
            span: Span::unknown(),
            kind,
            variable: Binding::new(variable),
            list: Box::new(list),
            predicate: predicate.map(Box::new),
        }
    }
}

#[cfg(test)]
mod tests;
