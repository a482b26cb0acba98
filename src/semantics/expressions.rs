//! Per-node semantic checks

use super::check::{expect_type, expect_type_with, fold_semantic_check, SemanticCheck};
use super::error::SemanticError;
use super::functions;
use super::typing::{function_typing, simple_typing};
use super::SemanticContext;
use crate::ast::{Binding, Expr};
use crate::diagnostics::semantic;
use crate::types::{CypherType, TypeSpec};

impl Expr {
    /// The check for this node and, transitively, its children
    pub fn semantic_check(&self, ctx: SemanticContext) -> SemanticCheck<'_> {
        match self {
            Expr::IntegerLit { .. } => simple_typing(self, CypherType::Integer.invariant()),
            Expr::FloatLit { .. } => simple_typing(self, CypherType::Float.invariant()),
            Expr::StringLit { .. } => simple_typing(self, CypherType::String.invariant()),
            Expr::BoolLit { .. } => simple_typing(self, CypherType::Boolean.invariant()),
            Expr::NullLit { .. } => simple_typing(self, TypeSpec::all()),
            Expr::Parameter { .. } => simple_typing(self, TypeSpec::all()),

            Expr::ListLit { items, .. } => {
                fold_semantic_check(items, move |item| item.semantic_check(ctx)).chain(
                    SemanticCheck::from_state(move |state| {
                        let types = if items.is_empty() {
                            CypherType::list(CypherType::Any).covariant()
                        } else {
                            items
                                .iter()
                                .fold(TypeSpec::none(), |acc, item| {
                                    acc.least_upper_bound(&state.types(item))
                                })
                                .wrap_in_list()
                        };
                        state.specify_type(self, types)
                    }),
                )
            }

            Expr::Variable { name, .. } => {
                SemanticCheck::from_state(move |state| state.ensure_variable_defined(name, self))
            }

            Expr::Property { map, .. } => map
                .semantic_check(ctx)
                .chain(expect_type_with(
                    map,
                    CypherType::Map.covariant(),
                    |_, actual| format!("Type mismatch: expected a map but was {}", actual),
                ))
                .chain(simple_typing(self, TypeSpec::all())),

            Expr::Prefix { op, operand, .. } => {
                function_typing(self, vec![&**operand], op.signatures(), ctx)
            }
            Expr::Postfix { op, operand, .. } => {
                function_typing(self, vec![&**operand], op.signatures(), ctx)
            }
            Expr::Infix { op, lhs, rhs, .. } => {
                function_typing(self, vec![&**lhs, &**rhs], op.signatures(), ctx)
            }

            Expr::FunctionCall {
                name, distinct, args, ..
            } => self.check_function_call(name, *distinct, args, ctx),

            Expr::CountStar { .. } => aggregation_allowed(self, "count(*)", ctx)
                .chain(simple_typing(self, CypherType::Integer.invariant())),

            Expr::ListComprehension {
                variable,
                list,
                predicate,
                projection,
                ..
            } => {
                let projection = projection.as_deref();
                check_filtered_list(list, ctx).chain(
                    declare_element(variable, list)
                        .chain(check_predicate(predicate.as_deref()))
                        .chain(match projection {
                            Some(projection) => projection.semantic_check(SemanticContext::Simple),
                            None => SemanticCheck::success(),
                        })
                        .chain(SemanticCheck::from_state(move |state| {
                            let types = match projection {
                                Some(projection) => state.types(projection).wrap_in_list(),
                                None => state.types(list),
                            };
                            let types = if types.is_empty() {
                                CypherType::list(CypherType::Any).covariant()
                            } else {
                                types
                            };
                            state.specify_type(self, types)
                        }))
                        .scoped(),
                )
            }

            Expr::IterablePredicate {
                kind,
                variable,
                list,
                predicate,
                ..
            } => check_filtered_list(list, ctx)
                .chain(
                    declare_element(variable, list)
                        .chain(check_predicate(predicate.as_deref()))
                        .scoped(),
                )
                .chain(SemanticCheck::when(predicate.is_none(), || {
                    SemanticCheck::error(SemanticError::new(
                        semantic::MISSING_PREDICATE,
                        format!("{}(...) requires a WHERE predicate", kind),
                        self.span(),
                    ))
                }))
                .chain(simple_typing(self, CypherType::Boolean.invariant())),
        }
    }

    fn check_function_call<'a>(
        &'a self,
        name: &'a str,
        distinct: bool,
        args: &'a [Expr],
        ctx: SemanticContext,
    ) -> SemanticCheck<'a> {
        let Some(function) = functions::lookup(name) else {
            return fold_semantic_check(args, move |arg| arg.semantic_check(ctx))
                .chain(SemanticCheck::error(SemanticError::new(
                    semantic::UNKNOWN_FUNCTION,
                    format!("Unknown function '{}'", name),
                    self.span(),
                )))
                .chain(simple_typing(self, TypeSpec::all()));
        };

        let arity = function.arity();
        let arity_error = if args.len() < *arity.start() {
            Some(format!("Insufficient parameters for function '{}'", function.name))
        } else if args.len() > *arity.end() {
            Some(format!("Too many parameters for function '{}'", function.name))
        } else {
            None
        };

        // Arguments of an aggregate may not aggregate themselves
        let argument_ctx = if function.aggregate {
            SemanticContext::Simple
        } else {
            ctx
        };

        let invocation = format!("{}(...)", function.name);
        SemanticCheck::when(function.aggregate, || {
            aggregation_allowed(self, &invocation, ctx)
        })
        .chain(SemanticCheck::when(distinct && !function.aggregate, || {
            SemanticCheck::error(SemanticError::new(
                semantic::INVALID_DISTINCT,
                format!(
                    "Invalid use of DISTINCT with function '{}'",
                    function.name
                ),
                self.span(),
            ))
        }))
        .chain(match arity_error {
            Some(message) => SemanticCheck::error(SemanticError::new(
                semantic::WRONG_ARGUMENT_COUNT,
                message,
                self.span(),
            )),
            None => SemanticCheck::success(),
        })
        .chain(function_typing(
            self,
            args.iter().collect(),
            function.signatures,
            argument_ctx,
        ))
    }
}

fn aggregation_allowed<'a>(expr: &'a Expr, invocation: &str, ctx: SemanticContext) -> SemanticCheck<'a> {
    SemanticCheck::when(ctx == SemanticContext::Simple, || {
        SemanticCheck::error(SemanticError::new(
            semantic::INVALID_AGGREGATION,
            format!("Invalid use of aggregating function {} in this context", invocation),
            expr.span(),
        ))
    })
}

/// The list of a filtering expression is checked in the enclosing scope and
/// must be a list.
fn check_filtered_list(list: &Expr, ctx: SemanticContext) -> SemanticCheck<'_> {
    list.semantic_check(ctx)
        .chain(expect_type(list, CypherType::list(CypherType::Any).covariant()))
}

/// Declare the bound variable with the list's element types. A list whose
/// types are unknown or wrong yields elements of any type.
fn declare_element<'a>(variable: &'a Binding, list: &'a Expr) -> SemanticCheck<'a> {
    SemanticCheck::from_state(move |state| {
        let elements = state.types(list).unwrap_lists();
        let elements = if elements.is_empty() {
            TypeSpec::all()
        } else {
            elements
        };
        state.declare_variable(variable, elements)
    })
}

fn check_predicate(predicate: Option<&Expr>) -> SemanticCheck<'_> {
    match predicate {
        Some(predicate) => predicate
            .semantic_check(SemanticContext::Simple)
            .chain(expect_type(predicate, CypherType::Boolean.covariant())),
        None => SemanticCheck::success(),
    }
}
