//! Generic accumulating traversal over expression trees

use super::Expr;

/// Pre-order, left-to-right fold.
///
/// For every visited node the visitor receives the accumulator and a
/// continuation that folds the node's children. The visitor can
/// - call the continuation with the accumulator unchanged,
/// - update the accumulator and then call it,
/// - or return without calling it, which prunes the subtree.
///
/// Work done after the continuation returns runs once the whole subtree has
/// been visited, which is how scoped state is pushed and popped.
pub fn fold<'a, A, F>(expr: &'a Expr, acc: A, visitor: &F) -> A
where
    F: Fn(&'a Expr, A, &dyn Fn(A) -> A) -> A,
{
    let children = |acc: A| {
        expr.children()
            .into_iter()
            .fold(acc, |acc, child| fold(child, acc, visitor))
    };
    visitor(expr, acc, &children)
}
