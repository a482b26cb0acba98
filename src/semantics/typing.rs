//! Typing of invocations against overloaded signatures

use super::check::{expect_type, fold_semantic_check, specify_type, CheckResult, SemanticCheck};
use super::SemanticContext;
use crate::ast::Expr;
use crate::types::{CypherType, TypeSpec};
use std::fmt;

/// One overload of an operator or function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Argument types, accepted covariantly
    pub arguments: Vec<CypherType>,
    pub output: TypeSpec,
}

impl Signature {
    pub fn new(arguments: Vec<CypherType>, output: impl Into<TypeSpec>) -> Self {
        Self {
            arguments,
            output: output.into(),
        }
    }

    pub fn arity(&self) -> usize {
        self.arguments.len()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arguments: Vec<String> = self.arguments.iter().map(ToString::to_string).collect();
        write!(f, "({}) -> {}", arguments.join(", "), self.output)
    }
}

/// Specify a fixed type for a node without children to check
pub fn simple_typing(expr: &Expr, types: TypeSpec) -> SemanticCheck<'_> {
    specify_type(expr, types)
}

/// Check every argument, then type `invocation` by resolving `signatures`
/// against the argument types.
pub fn function_typing<'a>(
    invocation: &'a Expr,
    arguments: Vec<&'a Expr>,
    signatures: Vec<Signature>,
    ctx: SemanticContext,
) -> SemanticCheck<'a> {
    fold_semantic_check(arguments.clone(), move |argument| argument.semantic_check(ctx))
        .chain(check_signatures(invocation, arguments, signatures))
}

/// Overload resolution.
///
/// Candidates are narrowed argument by argument. Each argument is expected
/// to be one of the types the remaining candidates accept at its position,
/// and candidates whose parameter cannot hold the argument's resulting types
/// are dropped. The invocation is specified with the union of the surviving
/// outputs, or with every type when nothing survives.
pub fn check_signatures<'a>(
    invocation: &'a Expr,
    arguments: Vec<&'a Expr>,
    signatures: Vec<Signature>,
) -> SemanticCheck<'a> {
    SemanticCheck::new(move |state| {
        let candidates: Vec<&[CypherType]> = signatures
            .iter()
            .filter(|signature| signature.arity() == arguments.len())
            .map(|signature| signature.arguments.as_slice())
            .collect();
        let outputs: Vec<&TypeSpec> = signatures
            .iter()
            .filter(|signature| signature.arity() == arguments.len())
            .map(|signature| &signature.output)
            .collect();

        let mut alive: Vec<usize> = (0..candidates.len()).collect();
        let mut result = CheckResult::success(state);

        for (position, argument) in arguments.iter().enumerate() {
            if alive.is_empty() {
                break;
            }
            let allowed = alive.iter().fold(TypeSpec::none(), |acc, &index| {
                acc.union(&candidates[index][position].covariant())
            });
            result = result.then(&expect_type(argument, allowed));

            let actual = result.state.types(argument);
            alive.retain(|&index| actual.contains_any(&candidates[index][position].covariant()));
            tracing::debug!(
                position,
                remaining = alive.len(),
                argument_types = %actual,
                "narrowed overload candidates"
            );
        }

        let output = if alive.is_empty() {
            TypeSpec::all()
        } else {
            alive
                .iter()
                .fold(TypeSpec::none(), |acc, &index| acc.union(outputs[index]))
        };
        tracing::debug!(output = %output, "resolved invocation type");

        let CheckResult { state, mut errors } = result;
        match state.specify_type(invocation, output) {
            Ok(state) => CheckResult { state, errors },
            Err(error) => {
                errors.push(error);
                CheckResult { state, errors }
            }
        }
    })
}
