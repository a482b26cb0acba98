use super::*;
use crate::ast::{Expr, InfixOp, PostfixOp, PredicateKind, PrefixOp};
use crate::diagnostics::semantic;
use crate::types::{CypherType, TypeSpec};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn analyze(expr: &Expr) -> Analysis<'_> {
    Analyzer::new().analyze(expr, SemanticContext::Simple)
}

fn analyze_with<'e>(analyzer: &Analyzer, expr: &'e Expr) -> Analysis<'e> {
    analyzer.analyze(expr, SemanticContext::Simple)
}

fn codes(analysis: &Analysis<'_>) -> Vec<&'static str> {
    analysis.errors.iter().map(|e| e.code).collect()
}

fn messages(analysis: &Analysis<'_>) -> Vec<String> {
    analysis.errors.iter().map(|e| e.message.clone()).collect()
}

fn names(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn int_float_catalog() -> Vec<Signature> {
    vec![
        Signature::new(vec![CypherType::Integer, CypherType::Integer], CypherType::Integer),
        Signature::new(vec![CypherType::Float, CypherType::Float], CypherType::Float),
    ]
}

// Literals and lists

#[test]
fn test_literal_types() {
    for (expr, expected) in [
        (Expr::integer(1), "Integer"),
        (Expr::float(1.5), "Float"),
        (Expr::string("s"), "String"),
        (Expr::boolean(false), "Boolean"),
        (Expr::null(), "Any"),
        (Expr::parameter("p"), "Any"),
    ] {
        let analysis = analyze(&expr);
        assert!(analysis.is_well_typed());
        assert_eq!(analysis.root_type().to_string(), expected);
    }
}

#[test]
fn test_list_of_mixed_numbers() {
    let expr = Expr::list(vec![Expr::integer(1), Expr::float(2.0)]);
    assert_eq!(analyze(&expr).root_type().to_string(), "List<Number>");
}

#[test]
fn test_empty_list_is_any_list() {
    let expr = Expr::list(vec![]);
    let analysis = analyze(&expr);
    assert_eq!(analysis.root_type(), CypherType::list(CypherType::Any).covariant());
    assert!(analysis.root_type().contains(&CypherType::list(CypherType::String)));
}

// Operators

#[test]
fn test_mixed_arithmetic_is_float() {
    let expr = Expr::infix(InfixOp::Add, Expr::integer(1), Expr::float(2.0));
    let analysis = analyze(&expr);
    assert!(analysis.is_well_typed());
    assert_eq!(analysis.root_type(), CypherType::Float.invariant());
}

#[test]
fn test_string_concatenation() {
    let expr = Expr::infix(InfixOp::Add, Expr::string("a"), Expr::string("b"));
    assert_eq!(analyze(&expr).root_type(), CypherType::String.invariant());
}

#[test]
fn test_boolean_operator_rejects_string() {
    let expr = Expr::infix(InfixOp::And, Expr::string("a"), Expr::boolean(true));
    let analysis = analyze(&expr);
    assert_eq!(codes(&analysis), vec![semantic::TYPE_MISMATCH]);
    assert_eq!(
        messages(&analysis),
        vec!["Type mismatch: expected Boolean but was String"]
    );
    assert!(analysis.root_type().is_all());
}

#[test]
fn test_unknown_operand_keeps_compatible_overloads() {
    let analyzer = Analyzer::new().declare("p", TypeSpec::all()).unwrap();
    let expr = Expr::infix(InfixOp::Add, Expr::variable("p"), Expr::integer(1));
    let analysis = analyze_with(&analyzer, &expr);
    assert!(analysis.is_well_typed());
    assert_eq!(analysis.root_type().to_string(), "Float or Integer");
}

#[test]
fn test_postfix_and_prefix() {
    let is_null = Expr::postfix(PostfixOp::IsNull, Expr::null());
    assert_eq!(analyze(&is_null).root_type(), CypherType::Boolean.invariant());

    let negated = Expr::prefix(PrefixOp::Negate, Expr::float(1.0));
    assert_eq!(analyze(&negated).root_type(), CypherType::Float.invariant());

    let not = Expr::prefix(PrefixOp::Not, Expr::integer(1));
    assert_eq!(
        messages(&analyze(&not)),
        vec!["Type mismatch: expected Boolean but was Integer"]
    );
}

#[test]
fn test_in_requires_list() {
    let ok = Expr::infix(
        InfixOp::In,
        Expr::integer(1),
        Expr::list(vec![Expr::integer(1)]),
    );
    assert!(analyze(&ok).is_well_typed());

    let bad = Expr::infix(InfixOp::In, Expr::integer(1), Expr::integer(2));
    assert_eq!(
        messages(&analyze(&bad)),
        vec!["Type mismatch: expected List<Any> but was Integer"]
    );
}

#[test]
fn test_errors_accumulate_in_order() {
    let expr = Expr::list(vec![
        Expr::infix(InfixOp::And, Expr::string("a"), Expr::boolean(true)),
        Expr::prefix(PrefixOp::Negate, Expr::string("b")),
    ]);
    assert_eq!(
        messages(&analyze(&expr)),
        vec![
            "Type mismatch: expected Boolean but was String",
            "Type mismatch: expected Float or Integer but was String",
        ]
    );
}

// Signature resolution

#[test]
fn test_overload_narrowing_to_nothing() {
    let (a, b) = (Expr::integer(1), Expr::float(2.0));
    let invocation = Expr::call("pick", vec![]);
    let result = function_typing(&invocation, vec![&a, &b], int_float_catalog(), SemanticContext::Simple)
        .run(SemanticState::new());

    assert_eq!(result.errors.len(), 1);
    assert_eq!(
        result.errors[0].message,
        "Type mismatch: expected Integer but was Float"
    );
    assert!(result.state.types(&invocation).is_all());
}

#[test]
fn test_overload_single_candidate() {
    let (a, b) = (Expr::integer(1), Expr::integer(2));
    let invocation = Expr::call("pick", vec![]);
    let result = function_typing(&invocation, vec![&a, &b], int_float_catalog(), SemanticContext::Simple)
        .run(SemanticState::new());

    assert!(result.is_success());
    assert_eq!(result.state.types(&invocation), CypherType::Integer.invariant());
}

#[test]
fn test_overload_selected_by_argument_type() {
    let catalog = vec![
        Signature::new(vec![CypherType::Integer], CypherType::Integer),
        Signature::new(vec![CypherType::String], CypherType::String),
    ];
    let a = Expr::integer(7);
    let invocation = Expr::call("pick", vec![]);
    let result = function_typing(&invocation, vec![&a], catalog, SemanticContext::Simple)
        .run(SemanticState::new());

    assert!(result.is_success());
    assert_eq!(result.state.types(&invocation), CypherType::Integer.invariant());
}

#[test]
fn test_overload_without_matching_arity_is_unconstrained() {
    let a = Expr::integer(1);
    let invocation = Expr::call("pick", vec![]);
    let result = check_signatures(&invocation, vec![&a], int_float_catalog()).run(SemanticState::new());
    assert!(result.is_success());
    assert!(result.state.types(&invocation).is_all());
    assert!(result.state.expression_type(a.id()).is_none());
}

#[test]
fn test_signature_display() {
    assert_eq!(int_float_catalog()[0].to_string(), "(Integer, Integer) -> Integer");
}

// Functions

#[test]
fn test_function_lookup_ignores_case() {
    let expr = Expr::call("toUpper", vec![Expr::string("a")]);
    assert_eq!(analyze(&expr).root_type(), CypherType::String.invariant());
    let expr = Expr::call("UPPER", vec![Expr::string("a")]);
    assert_eq!(analyze(&expr).root_type(), CypherType::String.invariant());
}

#[test]
fn test_function_with_covariant_parameter() {
    let expr = Expr::call("toString", vec![Expr::integer(3)]);
    let analysis = analyze(&expr);
    assert!(analysis.is_well_typed());
    assert_eq!(analysis.root_type(), CypherType::String.invariant());
}

#[test]
fn test_unknown_function() {
    let expr = Expr::call("frobnicate", vec![Expr::variable("missing")]);
    let analysis = analyze(&expr);
    assert_eq!(
        codes(&analysis),
        vec![semantic::UNDEFINED_VARIABLE, semantic::UNKNOWN_FUNCTION]
    );
    assert_eq!(analysis.errors[1].message, "Unknown function 'frobnicate'");
    assert!(analysis.root_type().is_all());
}

#[test]
fn test_wrong_argument_count() {
    let too_few = Expr::call("abs", vec![]);
    assert_eq!(
        messages(&analyze(&too_few)),
        vec!["Insufficient parameters for function 'abs'"]
    );

    let too_many = Expr::call("abs", vec![Expr::integer(1), Expr::integer(2)]);
    let analysis = analyze(&too_many);
    assert_eq!(codes(&analysis), vec![semantic::WRONG_ARGUMENT_COUNT]);
    assert!(analysis.root_type().is_all());
}

#[test]
fn test_optional_arguments() {
    let two = Expr::call("substring", vec![Expr::string("abc"), Expr::integer(1)]);
    let three = Expr::call(
        "substring",
        vec![Expr::string("abc"), Expr::integer(1), Expr::integer(1)],
    );
    assert!(analyze(&two).is_well_typed());
    assert!(analyze(&three).is_well_typed());
}

#[test]
fn test_aggregate_outside_results() {
    let expr = Expr::call("count", vec![Expr::integer(1)]);
    let analysis = analyze(&expr);
    assert_eq!(codes(&analysis), vec![semantic::INVALID_AGGREGATION]);
    assert_eq!(
        analysis.errors[0].message,
        "Invalid use of aggregating function count(...) in this context"
    );
    assert_eq!(analysis.root_type(), CypherType::Integer.invariant());

    let results = Analyzer::new().analyze(&expr, SemanticContext::Results);
    assert!(results.is_well_typed());
}

#[test]
fn test_count_star() {
    let expr = Expr::count_star();
    assert_eq!(codes(&analyze(&expr)), vec![semantic::INVALID_AGGREGATION]);
    let results = Analyzer::new().analyze(&expr, SemanticContext::Results);
    assert!(results.is_well_typed());
    assert_eq!(results.root_type(), CypherType::Integer.invariant());
}

#[test]
fn test_nested_aggregate() {
    let expr = Expr::call("sum", vec![Expr::call("count", vec![Expr::integer(1)])]);
    let analysis = Analyzer::new().analyze(&expr, SemanticContext::Results);
    assert_eq!(codes(&analysis), vec![semantic::INVALID_AGGREGATION]);
    assert_eq!(analysis.root_type(), CypherType::Integer.invariant());
}

#[test]
fn test_distinct_requires_aggregate() {
    let expr = Expr::call_distinct("abs", vec![Expr::integer(1)]);
    assert_eq!(codes(&analyze(&expr)), vec![semantic::INVALID_DISTINCT]);

    let expr = Expr::call_distinct("collect", vec![Expr::integer(1)]);
    assert!(Analyzer::new()
        .analyze(&expr, SemanticContext::Results)
        .is_well_typed());
}

// Properties and variables

#[test]
fn test_property_of_node() {
    let analyzer = Analyzer::new()
        .declare("n", CypherType::Node.invariant())
        .unwrap();
    let expr = Expr::property(Expr::variable("n"), "name");
    let analysis = analyze_with(&analyzer, &expr);
    assert!(analysis.is_well_typed());
    assert!(analysis.root_type().is_all());
}

#[test]
fn test_property_of_non_map() {
    let expr = Expr::property(Expr::integer(1), "name");
    assert_eq!(
        messages(&analyze(&expr)),
        vec!["Type mismatch: expected a map but was Integer"]
    );
}

#[test]
fn test_undefined_variable_is_reported_once() {
    let expr = Expr::infix(InfixOp::Gt, Expr::variable("x"), Expr::integer(0));
    let analysis = analyze(&expr);
    assert_eq!(codes(&analysis), vec![semantic::UNDEFINED_VARIABLE]);
    assert_eq!(analysis.root_type(), CypherType::Boolean.invariant());
}

// Filtering expressions

#[test]
fn test_comprehension_with_projection() {
    // [x IN [1, 2] WHERE x > 0 | x + 1]
    let expr = Expr::comprehension(
        "x",
        Expr::list(vec![Expr::integer(1), Expr::integer(2)]),
        Some(Expr::infix(InfixOp::Gt, Expr::variable("x"), Expr::integer(0))),
        Some(Expr::infix(InfixOp::Add, Expr::variable("x"), Expr::integer(1))),
    );
    let analysis = analyze(&expr);
    assert!(analysis.is_well_typed(), "{:?}", analysis.errors);
    assert_eq!(analysis.root_type().to_string(), "List<Integer>");
}

#[test]
fn test_comprehension_without_projection_keeps_list_type() {
    let expr = Expr::comprehension(
        "x",
        Expr::list(vec![Expr::float(1.5)]),
        Some(Expr::infix(InfixOp::Gt, Expr::variable("x"), Expr::integer(1))),
        None,
    );
    assert_eq!(analyze(&expr).root_type().to_string(), "List<Float>");
}

#[test]
fn test_comprehension_shadows_outer_variable() {
    let analyzer = Analyzer::new()
        .declare("x", CypherType::String.invariant())
        .unwrap();
    let expr = Expr::comprehension(
        "x",
        Expr::list(vec![Expr::integer(1)]),
        None,
        Some(Expr::infix(InfixOp::Mul, Expr::variable("x"), Expr::integer(2))),
    );
    let analysis = analyze_with(&analyzer, &expr);
    assert!(analysis.is_well_typed(), "{:?}", analysis.errors);
    assert_eq!(analysis.root_type().to_string(), "List<Integer>");
    assert_eq!(
        analysis.symbol("x").map(|s| s.types.clone()),
        Some(CypherType::String.invariant())
    );
}

#[test]
fn test_bound_variable_is_not_visible_outside() {
    // [x IN [1] | x] + x
    let expr = Expr::infix(
        InfixOp::Add,
        Expr::comprehension("x", Expr::list(vec![Expr::integer(1)]), None, Some(Expr::variable("x"))),
        Expr::variable("x"),
    );
    let analysis = analyze(&expr);
    assert_eq!(codes(&analysis), vec![semantic::UNDEFINED_VARIABLE]);
}

#[test]
fn test_iterable_predicate() {
    let expr = Expr::iterable(
        PredicateKind::All,
        "x",
        Expr::list(vec![Expr::integer(1)]),
        Some(Expr::infix(InfixOp::Gt, Expr::variable("x"), Expr::integer(0))),
    );
    let analysis = analyze(&expr);
    assert!(analysis.is_well_typed());
    assert_eq!(analysis.root_type(), CypherType::Boolean.invariant());
}

#[test]
fn test_iterable_predicate_requires_predicate() {
    let expr = Expr::iterable(PredicateKind::None, "x", Expr::list(vec![]), None);
    let analysis = analyze(&expr);
    assert_eq!(codes(&analysis), vec![semantic::MISSING_PREDICATE]);
    assert_eq!(analysis.errors[0].message, "none(...) requires a WHERE predicate");
    assert_eq!(analysis.root_type(), CypherType::Boolean.invariant());
}

#[test]
fn test_filter_over_non_list() {
    let expr = Expr::iterable(
        PredicateKind::Any,
        "x",
        Expr::integer(1),
        Some(Expr::infix(InfixOp::Gt, Expr::variable("x"), Expr::integer(0))),
    );
    assert_eq!(
        messages(&analyze(&expr)),
        vec!["Type mismatch: expected List<Any> but was Integer"]
    );
}

#[test]
fn test_comprehension_over_non_list_does_not_cascade() {
    let comprehension = Expr::comprehension("x", Expr::integer(1), Some(Expr::boolean(true)), None);
    let expr = Expr::call("size", vec![comprehension]);
    let analysis = analyze(&expr);
    assert_eq!(
        messages(&analysis),
        vec!["Type mismatch: expected List<Any> but was Integer"]
    );

    let Expr::FunctionCall { args, .. } = &expr else {
        unreachable!()
    };
    assert_eq!(
        analysis.type_of(&args[0]),
        CypherType::list(CypherType::Any).covariant()
    );
    assert_eq!(analysis.root_type(), CypherType::Integer.invariant());
}

#[test]
fn test_predicate_must_be_boolean() {
    let expr = Expr::iterable(
        PredicateKind::Single,
        "x",
        Expr::list(vec![Expr::integer(1)]),
        Some(Expr::infix(InfixOp::Add, Expr::variable("x"), Expr::integer(1))),
    );
    assert_eq!(
        messages(&analyze(&expr)),
        vec!["Type mismatch: expected Boolean but was Integer"]
    );
}

#[test]
fn test_aggregate_inside_predicate() {
    let expr = Expr::iterable(
        PredicateKind::Any,
        "x",
        Expr::list(vec![Expr::integer(1)]),
        Some(Expr::infix(
            InfixOp::Gt,
            Expr::variable("x"),
            Expr::call("count", vec![Expr::variable("x")]),
        )),
    );
    let analysis = Analyzer::new().analyze(&expr, SemanticContext::Results);
    assert_eq!(codes(&analysis), vec![semantic::INVALID_AGGREGATION]);
}

// Dependencies

#[test]
fn test_dependencies_of_plain_expression() {
    let expr = Expr::infix(
        InfixOp::Add,
        Expr::property(Expr::variable("n"), "age"),
        Expr::variable("m"),
    );
    assert_eq!(dependencies(&expr), names(&["m", "n"]));
}

#[test]
fn test_dependencies_exclude_bound_variable() {
    // any(x IN list WHERE x > 0)
    let expr = Expr::iterable(
        PredicateKind::Any,
        "x",
        Expr::variable("list"),
        Some(Expr::infix(InfixOp::Gt, Expr::variable("x"), Expr::integer(0))),
    );
    assert_eq!(dependencies(&expr), names(&["list"]));
}

#[test]
fn test_dependencies_keep_free_occurrence_of_bound_name() {
    // x AND any(x IN list WHERE x > 0)
    let expr = Expr::infix(
        InfixOp::And,
        Expr::variable("x"),
        Expr::iterable(
            PredicateKind::Any,
            "x",
            Expr::variable("list"),
            Some(Expr::infix(InfixOp::Gt, Expr::variable("x"), Expr::integer(0))),
        ),
    );
    assert_eq!(dependencies(&expr), names(&["list", "x"]));

    // any(x IN list WHERE x > 0) AND x
    let expr = Expr::infix(
        InfixOp::And,
        Expr::iterable(
            PredicateKind::Any,
            "x",
            Expr::variable("list"),
            Some(Expr::infix(InfixOp::Gt, Expr::variable("x"), Expr::integer(0))),
        ),
        Expr::variable("x"),
    );
    assert_eq!(dependencies(&expr), names(&["list", "x"]));
}

#[test]
fn test_dependencies_of_list_ignore_binding() {
    // [x IN x | x]
    let expr = Expr::comprehension("x", Expr::variable("x"), None, Some(Expr::variable("x")));
    assert_eq!(dependencies(&expr), names(&["x"]));
}

#[test]
fn test_dependencies_of_nested_filters() {
    // [x IN xs | any(y IN x WHERE y > x + z)]
    let expr = Expr::comprehension(
        "x",
        Expr::variable("xs"),
        None,
        Some(Expr::iterable(
            PredicateKind::Any,
            "y",
            Expr::variable("x"),
            Some(Expr::infix(
                InfixOp::Gt,
                Expr::variable("y"),
                Expr::infix(InfixOp::Add, Expr::variable("x"), Expr::variable("z")),
            )),
        )),
    );
    assert_eq!(dependencies(&expr), names(&["xs", "z"]));
}

#[test]
fn test_analysis_reports_dependencies_and_subtree_types() {
    let analyzer = Analyzer::new()
        .declare("n", CypherType::Node.invariant())
        .unwrap();
    let expr = Expr::infix(InfixOp::Eq, Expr::variable("n"), Expr::integer(1));
    let analysis = analyze_with(&analyzer, &expr);

    assert_eq!(analysis.dependencies(), names(&["n"]));
    let types = analysis.types_for_subtree();
    assert_eq!(types.len(), 3);
    assert_eq!(types[&expr.id()], CypherType::Boolean.invariant());
    assert!(analysis.diagnostics(None).is_empty());
}

#[test]
fn test_diagnostics_carry_codes_and_notes() {
    let expr = Expr::count_star();
    let analysis = analyze(&expr);
    let bag = analysis.diagnostics(Some(std::path::Path::new("q.json")));
    assert_eq!(bag.error_count(), 1);
    let diagnostic = &bag.diagnostics()[0];
    assert_eq!(diagnostic.code, semantic::INVALID_AGGREGATION);
    assert_eq!(diagnostic.notes.len(), 1);
    insta::assert_snapshot!(
        diagnostic.to_human_readable(None).trim_end(),
        @r"
    error[E1007]: Invalid use of aggregating function count(*) in this context
      --> q.json:1:1
       = note: aggregating functions are only allowed in result projections
    "
    );
}
