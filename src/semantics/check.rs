//! Composable semantic checks
//!
//! A `SemanticCheck` is a function from a state to a new state plus the errors
//! it found. Chained checks always run; errors accumulate in order.

use super::error::{type_mismatch_message, SemanticError};
use super::state::SemanticState;
use crate::ast::Expr;
use crate::diagnostics::semantic;
use crate::types::TypeSpec;

/// Outcome of running a check
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub state: SemanticState,
    pub errors: Vec<SemanticError>,
}

impl CheckResult {
    pub fn success(state: SemanticState) -> Self {
        Self {
            state,
            errors: Vec::new(),
        }
    }

    pub fn error(state: SemanticState, error: SemanticError) -> Self {
        Self {
            state,
            errors: vec![error],
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Run `next` on this result's state, keeping this result's errors first
    pub fn then(self, next: &SemanticCheck<'_>) -> CheckResult {
        let CheckResult { state, mut errors } = self;
        let result = next.run(state);
        errors.extend(result.errors);
        CheckResult {
            state: result.state,
            errors,
        }
    }
}

pub struct SemanticCheck<'a> {
    run: Box<dyn Fn(SemanticState) -> CheckResult + 'a>,
}

impl<'a> SemanticCheck<'a> {
    pub fn new(run: impl Fn(SemanticState) -> CheckResult + 'a) -> Self {
        Self { run: Box::new(run) }
    }

    /// Leaves the state untouched
    pub fn success() -> Self {
        Self::new(CheckResult::success)
    }

    /// Reports `error` without changing the state
    pub fn error(error: SemanticError) -> Self {
        Self::new(move |state| CheckResult::error(state, error.clone()))
    }

    /// Lift a fallible state transition. On failure the input state is kept.
    pub fn from_state(
        transition: impl Fn(&SemanticState) -> Result<SemanticState, SemanticError> + 'a,
    ) -> Self {
        Self::new(move |state| match transition(&state) {
            Ok(next) => CheckResult::success(next),
            Err(error) => CheckResult::error(state, error),
        })
    }

    pub fn run(&self, state: SemanticState) -> CheckResult {
        (self.run)(state)
    }

    /// Run `self`, then `next` on the resulting state. `next` runs even if
    /// `self` reported errors.
    pub fn chain(self, next: SemanticCheck<'a>) -> SemanticCheck<'a> {
        SemanticCheck::new(move |state| self.run(state).then(&next))
    }

    /// `check` when the condition holds, success otherwise
    pub fn when(condition: bool, check: impl FnOnce() -> SemanticCheck<'a>) -> SemanticCheck<'a> {
        if condition {
            check()
        } else {
            SemanticCheck::success()
        }
    }

    /// Run inside a fresh innermost scope
    pub fn scoped(self) -> SemanticCheck<'a> {
        SemanticCheck::new(move |state| {
            let CheckResult { state, errors } = self.run(state.push_scope());
            CheckResult {
                state: state.pop_scope(),
                errors,
            }
        })
    }
}

impl std::fmt::Debug for SemanticCheck<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SemanticCheck(..)")
    }
}

/// Chain one check per item, in iteration order
pub fn fold_semantic_check<'a, T>(
    items: impl IntoIterator<Item = T>,
    check: impl FnMut(T) -> SemanticCheck<'a>,
) -> SemanticCheck<'a> {
    items
        .into_iter()
        .map(check)
        .fold(SemanticCheck::success(), SemanticCheck::chain)
}

pub fn specify_type<'a>(expr: &'a Expr, types: TypeSpec) -> SemanticCheck<'a> {
    SemanticCheck::from_state(move |state| state.specify_type(expr, types.clone()))
}

/// Expect `expr` to be one of `possible`, reporting the default mismatch
/// message otherwise
pub fn expect_type<'a>(expr: &'a Expr, possible: TypeSpec) -> SemanticCheck<'a> {
    expect_type_with(expr, possible, type_mismatch_message)
}

/// Like [`expect_type`], with `message(expected, specified)` on mismatch
pub fn expect_type_with<'a>(
    expr: &'a Expr,
    possible: TypeSpec,
    message: impl Fn(&TypeSpec, &TypeSpec) -> String + 'a,
) -> SemanticCheck<'a> {
    SemanticCheck::new(move |state| {
        let specified = state.types(expr);
        let (state, actual) = state.expect_type(expr, &possible);
        if actual.is_empty() {
            let error = SemanticError::new(
                semantic::TYPE_MISMATCH,
                message(&possible, &specified),
                expr.span(),
            );
            CheckResult::error(state, error)
        } else {
            CheckResult::success(state)
        }
    })
}
