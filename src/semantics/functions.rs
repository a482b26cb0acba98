//! Built-in function catalog

use super::typing::Signature;
use crate::types::{CypherType, TypeSpec};
use std::ops::RangeInclusive;

use CypherType::{Any, Boolean, Float, Integer, Map, Node, Number, Path, Relationship};

/// A known function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Canonical spelling
    pub name: &'static str,
    pub aggregate: bool,
    pub signatures: Vec<Signature>,
}

impl Function {
    fn scalar(name: &'static str, signatures: Vec<Signature>) -> Self {
        Self {
            name,
            aggregate: false,
            signatures,
        }
    }

    fn aggregating(name: &'static str, signatures: Vec<Signature>) -> Self {
        Self {
            name,
            aggregate: true,
            signatures,
        }
    }

    /// Argument counts accepted by some overload
    pub fn arity(&self) -> RangeInclusive<usize> {
        let min = self.signatures.iter().map(Signature::arity).min().unwrap_or(0);
        let max = self.signatures.iter().map(Signature::arity).max().unwrap_or(0);
        min..=max
    }
}

fn string() -> CypherType {
    CypherType::String
}

fn list_of(inner: CypherType) -> CypherType {
    CypherType::list(inner)
}

/// Look up a function by name, ignoring case
pub fn lookup(name: &str) -> Option<Function> {
    let function = match name.to_lowercase().as_str() {
        // Numeric
        "abs" => Function::scalar(
            "abs",
            vec![
                Signature::new(vec![Integer], Integer),
                Signature::new(vec![Float], Float),
            ],
        ),
        "ceil" => Function::scalar("ceil", vec![Signature::new(vec![Float], Float)]),
        "floor" => Function::scalar("floor", vec![Signature::new(vec![Float], Float)]),
        "round" => Function::scalar("round", vec![Signature::new(vec![Float], Float)]),
        "sqrt" => Function::scalar("sqrt", vec![Signature::new(vec![Float], Float)]),
        "sign" => Function::scalar(
            "sign",
            vec![
                Signature::new(vec![Integer], Integer),
                Signature::new(vec![Float], Integer),
            ],
        ),

        // Conversion
        "tostring" => Function::scalar(
            "toString",
            vec![
                Signature::new(vec![Number], string()),
                Signature::new(vec![Boolean], string()),
                Signature::new(vec![string()], string()),
            ],
        ),
        "tointeger" => Function::scalar(
            "toInteger",
            vec![
                Signature::new(vec![Number], Integer),
                Signature::new(vec![string()], Integer),
            ],
        ),
        "tofloat" => Function::scalar(
            "toFloat",
            vec![
                Signature::new(vec![Number], Float),
                Signature::new(vec![string()], Float),
            ],
        ),
        "toboolean" => Function::scalar(
            "toBoolean",
            vec![
                Signature::new(vec![string()], Boolean),
                Signature::new(vec![Boolean], Boolean),
            ],
        ),

        // Collections
        "size" => Function::scalar(
            "size",
            vec![
                Signature::new(vec![list_of(Any)], Integer),
                Signature::new(vec![string()], Integer),
            ],
        ),
        "length" => Function::scalar("length", vec![Signature::new(vec![Path], Integer)]),
        "head" => Function::scalar("head", vec![Signature::new(vec![list_of(Any)], TypeSpec::all())]),
        "last" => Function::scalar("last", vec![Signature::new(vec![list_of(Any)], TypeSpec::all())]),
        "range" => Function::scalar(
            "range",
            vec![
                Signature::new(vec![Integer, Integer], list_of(Integer)),
                Signature::new(vec![Integer, Integer, Integer], list_of(Integer)),
            ],
        ),
        "keys" => Function::scalar("keys", vec![Signature::new(vec![Map], list_of(string()))]),

        // Strings
        "upper" | "toupper" => Function::scalar("toUpper", vec![Signature::new(vec![string()], string())]),
        "lower" | "tolower" => Function::scalar("toLower", vec![Signature::new(vec![string()], string())]),
        "trim" => Function::scalar("trim", vec![Signature::new(vec![string()], string())]),
        "substring" => Function::scalar(
            "substring",
            vec![
                Signature::new(vec![string(), Integer], string()),
                Signature::new(vec![string(), Integer, Integer], string()),
            ],
        ),

        // Graph
        "labels" => Function::scalar("labels", vec![Signature::new(vec![Node], list_of(string()))]),
        "type" => Function::scalar("type", vec![Signature::new(vec![Relationship], string())]),
        "nodes" => Function::scalar("nodes", vec![Signature::new(vec![Path], list_of(Node))]),
        "relationships" => Function::scalar(
            "relationships",
            vec![Signature::new(vec![Path], list_of(Relationship))],
        ),
        "exists" => Function::scalar("exists", vec![Signature::new(vec![Any], Boolean)]),
        "id" => Function::scalar(
            "id",
            vec![
                Signature::new(vec![Node], Integer),
                Signature::new(vec![Relationship], Integer),
            ],
        ),

        // Aggregation
        "count" => Function::aggregating("count", vec![Signature::new(vec![Any], Integer)]),
        "sum" => Function::aggregating(
            "sum",
            vec![
                Signature::new(vec![Integer], Integer),
                Signature::new(vec![Float], Float),
            ],
        ),
        "avg" => Function::aggregating("avg", vec![Signature::new(vec![Number], Float)]),
        "min" => Function::aggregating("min", vec![Signature::new(vec![Any], TypeSpec::all())]),
        "max" => Function::aggregating("max", vec![Signature::new(vec![Any], TypeSpec::all())]),
        "collect" => Function::aggregating(
            "collect",
            vec![Signature::new(vec![Any], TypeSpec::covariant(list_of(Any)))],
        ),

        _ => return None,
    };
    Some(function)
}
