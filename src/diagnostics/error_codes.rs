//! Error code definitions and documentation

/// Semantic errors (E1xxx)
pub mod semantic {
    pub const TYPE_MISMATCH: &str = "E1001";
    pub const UNDEFINED_VARIABLE: &str = "E1002";
    pub const VARIABLE_ALREADY_DECLARED: &str = "E1003";
    pub const RESPECIFIED_TYPE: &str = "E1004";
    pub const UNKNOWN_FUNCTION: &str = "E1005";
    pub const WRONG_ARGUMENT_COUNT: &str = "E1006";
    pub const INVALID_AGGREGATION: &str = "E1007";
    pub const INVALID_DISTINCT: &str = "E1008";
    pub const MISSING_PREDICATE: &str = "E1009";
}

/// Warnings (W0xxx)
pub mod warnings {
    pub const UNUSED_VARIABLE: &str = "W0001";
}

/// Long-form explanation for a code, as shown by `quarry explain`
pub fn explanation(code: &str) -> Option<&'static str> {
    let text = match code {
        "E1001" => {
            "Type mismatch\n\n\
             An expression's inferred types do not intersect the types its position \
             accepts, e.g. `'a' AND true` where AND accepts only Boolean operands. \
             The message lists the accepted types and the inferred ones, each joined \
             with ' or '."
        }
        "E1002" => {
            "Variable not defined\n\n\
             An identifier is read that no enclosing scope declares. Declare it in \
             the `[variables]` table of quarry.toml or bind it with a list \
             comprehension or iterable predicate."
        }
        "E1003" => {
            "Variable already declared\n\n\
             A name is declared twice in the same scope. Nested comprehensions open \
             a new scope and may reuse a name."
        }
        "E1004" => {
            "Conflicting type specification\n\n\
             An expression was already known to have types that do not intersect the \
             newly inferred ones."
        }
        "E1005" => {
            "Unknown function\n\n\
             The invoked function is not part of the built-in catalog. Function names \
             are matched case-insensitively."
        }
        "E1006" => {
            "Wrong argument count\n\n\
             The function is invoked with a number of arguments none of its \
             signatures accepts."
        }
        "E1007" => {
            "Invalid use of aggregating function\n\n\
             Aggregating functions such as count() or collect() are only allowed in \
             result projections, not in predicates or comprehension bodies."
        }
        "E1008" => {
            "Invalid use of DISTINCT\n\n\
             DISTINCT is only meaningful for aggregating functions."
        }
        "E1009" => {
            "Missing predicate\n\n\
             any(), all(), none() and single() require a WHERE predicate."
        }
        "W0001" => {
            "Unused variable\n\n\
             A variable declared in the query document is not read by any of the \
             document's expressions. Variables from quarry.toml are shared by every \
             document and are never reported."
        }
        _ => return None,
    };
    Some(text)
}
