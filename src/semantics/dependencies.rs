//! Free identifiers of an expression

use crate::ast::{fold, Binding, Expr};
use std::collections::BTreeSet;

#[derive(Debug, Default)]
struct Scan {
    collected: BTreeSet<String>,
    /// Names bound by enclosing filtering expressions, innermost last
    shadowed: Vec<String>,
}

impl Scan {
    fn is_shadowed(&self, name: &str) -> bool {
        self.shadowed.iter().any(|shadowed| shadowed == name)
    }
}

/// Identifiers the expression reads from its environment. Names bound by a
/// filtering expression are excluded inside that expression's predicate and
/// projection, but not in its list.
pub fn dependencies(expr: &Expr) -> BTreeSet<String> {
    fold(expr, Scan::default(), &visit).collected
}

fn visit(node: &Expr, mut scan: Scan, children: &dyn Fn(Scan) -> Scan) -> Scan {
    if let Expr::Variable { name, .. } = node {
        if !scan.is_shadowed(name) {
            scan.collected.insert(name.clone());
        }
        return scan;
    }

    match node.bound_variable() {
        Some(binding) => {
            let own = filter_dependencies(node, binding);
            for name in own {
                if !scan.is_shadowed(&name) {
                    scan.collected.insert(name);
                }
            }
            scan
        }
        None => children(scan),
    }
}

/// Dependencies of a filtering expression on its own. Its first child is the
/// list, read outside the binding; the rest see `binding`.
fn filter_dependencies(node: &Expr, binding: &Binding) -> BTreeSet<String> {
    let children = node.children();
    let Some((list, body)) = children.split_first() else {
        return BTreeSet::new();
    };

    let mut scan = fold(list, Scan::default(), &visit);
    scan.shadowed.push(binding.name.clone());
    let mut scan = body
        .iter()
        .fold(scan, |scan, expr| fold(expr, scan, &visit));
    scan.shadowed.pop();
    scan.collected
}
