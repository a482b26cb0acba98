use super::*;
use pretty_assertions::assert_eq;

/// `abs(-1) + [2, 3]`
fn sample_tree() -> Expr {
    Expr::infix(
        InfixOp::Add,
        Expr::call(
            "abs",
            vec![Expr::prefix(PrefixOp::Negate, Expr::integer(1))],
        ),
        Expr::list(vec![Expr::integer(2), Expr::integer(3)]),
    )
}

fn describe(expr: &Expr) -> String {
    match expr {
        Expr::IntegerLit { value, .. } => value.to_string(),
        Expr::FunctionCall { name, .. } => format!("{}()", name),
        Expr::Prefix { op, .. } => format!("prefix {}", op),
        Expr::Infix { op, .. } => format!("infix {}", op),
        Expr::ListLit { .. } => "list".to_string(),
        other => format!("{:?}", other),
    }
}

#[test]
fn test_node_ids_are_unique() {
    let a = NodeId::new();
    let b = NodeId::new();
    assert_ne!(a, b);
}

#[test]
fn test_children_are_in_source_order() {
    let tree = sample_tree();
    let children: Vec<String> = tree.children().into_iter().map(describe).collect();
    assert_eq!(children, vec!["abs()".to_string(), "list".to_string()]);
}

#[test]
fn test_descendants_exclude_root_in_pre_order() {
    let tree = sample_tree();
    let names: Vec<String> = tree.descendants().into_iter().map(describe).collect();
    assert_eq!(
        names,
        vec!["abs()", "prefix -", "1", "list", "2", "3"]
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_leaf_has_no_descendants() {
    assert!(Expr::variable("n").descendants().is_empty());
}

#[test]
fn test_fold_pruning_skips_descendants() {
    let tree = sample_tree();
    // 7 nodes in total; the call has 2 descendants
    assert_eq!(tree.descendants().len() + 1, 7);

    let visited = tree.tree_fold(Vec::new(), |node, mut acc, children| {
        acc.push(describe(node));
        if matches!(node, Expr::FunctionCall { .. }) {
            acc
        } else {
            children(acc)
        }
    });

    assert_eq!(visited.len(), 5);
    assert!(visited.contains(&"abs()".to_string()));
    assert!(!visited.contains(&"prefix -".to_string()));
    assert!(!visited.contains(&"1".to_string()));
}

#[test]
fn test_fold_work_after_continuation_sees_subtree() {
    // Count how many nodes each list literal encloses by diffing the counter
    // around the continuation.
    let tree = sample_tree();
    let (count, enclosed) = tree.tree_fold((0usize, Vec::new()), |node, (count, enclosed), children| {
        let before = count;
        let (count, mut enclosed) = children((count + 1, enclosed));
        if matches!(node, Expr::ListLit { .. }) {
            enclosed.push(count - before - 1);
        }
        (count, enclosed)
    });
    assert_eq!(count, 7);
    assert_eq!(enclosed, vec![2]);
}

#[test]
fn test_bound_variable() {
    let filter = Expr::iterable(
        PredicateKind::Any,
        "x",
        Expr::variable("xs"),
        Some(Expr::boolean(true)),
    );
    assert_eq!(filter.bound_variable().map(|b| b.name.as_str()), Some("x"));
    assert!(Expr::variable("x").bound_variable().is_none());
}

#[test]
fn test_comprehension_children_skip_missing_parts() {
    let comprehension = Expr::comprehension("x", Expr::variable("xs"), None, Some(Expr::variable("x")));
    assert_eq!(comprehension.children().len(), 2);
}

#[test]
fn test_deserialize_tree_without_ids() {
    let json = r#"{
        "type": "IterablePredicate",
        "kind": "any",
        "variable": { "name": "x" },
        "list": { "type": "Variable", "name": "xs" },
        "predicate": {
            "type": "Infix",
            "op": "Gt",
            "lhs": { "type": "Variable", "name": "x" },
            "rhs": { "type": "IntegerLit", "value": 0, "span": { "start": 22, "end": 23, "line": 1, "column": 23 } }
        }
    }"#;

    let expr: Expr = serde_json::from_str(json).unwrap();
    let ids: Vec<NodeId> = std::iter::once(&expr)
        .chain(expr.descendants())
        .map(Expr::id)
        .collect();
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());

    let rhs = expr.descendants().into_iter().last().unwrap();
    assert_eq!(rhs.span().column, 23);
}

#[test]
fn test_duplicate_ids_are_renumbered() {
    let json = r#"{
        "type": "IterablePredicate", "id": 3,
        "kind": "any",
        "variable": { "id": 1, "name": "x" },
        "list": { "type": "ListLit", "id": 1, "items": [{ "type": "StringLit", "id": 2, "value": "a" }] },
        "predicate": { "type": "BoolLit", "id": 4, "value": true }
    }"#;

    let mut expr: Expr = serde_json::from_str(json).unwrap();
    assert!(expr.ensure_unique_ids());
    assert_eq!(
        expr.node_ids(),
        vec![NodeId(1), NodeId(2), NodeId(3), NodeId(4), NodeId(5)]
    );
    assert_eq!(expr.bound_variable().unwrap().id, NodeId(2));
}

#[test]
fn test_unique_explicit_ids_are_kept() {
    let json = r#"{
        "type": "IterablePredicate", "id": 3,
        "kind": "any",
        "variable": { "id": 5, "name": "x" },
        "list": { "type": "ListLit", "id": 1, "items": [{ "type": "StringLit", "id": 2, "value": "a" }] },
        "predicate": { "type": "BoolLit", "id": 4, "value": true }
    }"#;

    let mut expr: Expr = serde_json::from_str(json).unwrap();
    assert!(!expr.ensure_unique_ids());
    assert_eq!(
        expr.node_ids(),
        vec![NodeId(3), NodeId(5), NodeId(1), NodeId(2), NodeId(4)]
    );
}

#[test]
fn test_with_span() {
    let span = Span::new(3, 9, 2, 1);
    assert_eq!(Expr::count_star().with_span(span).span(), span);
}

#[test]
fn test_operator_display() {
    assert_eq!(InfixOp::StartsWith.to_string(), "STARTS WITH");
    assert_eq!(PostfixOp::IsNotNull.to_string(), "IS NOT NULL");
    assert_eq!(PredicateKind::Single.to_string(), "single");
}
