//! The query language's type lattice
//!
//! Types form a tree rooted at `Any`. Every type except `Any` has exactly
//! one parent, so any two types have a unique least upper bound.

mod spec;

pub use spec::TypeSpec;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single type of the query language
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CypherType {
    Any,
    Boolean,
    String,
    Number,
    Integer,
    Float,
    Map,
    Node,
    Relationship,
    Path,
    List(Box<CypherType>),
}

impl CypherType {
    /// `List<inner>`
    pub fn list(inner: CypherType) -> Self {
        CypherType::List(Box::new(inner))
    }

    /// The direct supertype, `None` for `Any`
    pub fn parent(&self) -> Option<CypherType> {
        match self {
            CypherType::Any => None,
            CypherType::Integer | CypherType::Float => Some(CypherType::Number),
            CypherType::Node | CypherType::Relationship => Some(CypherType::Map),
            CypherType::List(inner) => Some(match inner.parent() {
                Some(parent) => CypherType::list(parent),
                None => CypherType::Any,
            }),
            _ => Some(CypherType::Any),
        }
    }

    /// This type followed by all of its supertypes, ending with `Any`
    pub fn ancestors(&self) -> impl Iterator<Item = CypherType> {
        std::iter::successors(Some(self.clone()), |t| t.parent())
    }

    /// Distance from `Any`
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }

    /// Whether a value of type `other` can be used where `self` is expected
    pub fn is_assignable_from(&self, other: &CypherType) -> bool {
        other.ancestors().any(|t| t == *self)
    }

    /// Whether any type other than `self` is assignable to `self`
    pub fn has_subtypes(&self) -> bool {
        match self {
            CypherType::Any | CypherType::Number | CypherType::Map => true,
            CypherType::List(inner) => inner.has_subtypes(),
            _ => false,
        }
    }

    /// The most specific common supertype
    pub fn least_upper_bound(&self, other: &CypherType) -> CypherType {
        self.ancestors()
            .find(|t| t.is_assignable_from(other))
            .unwrap_or(CypherType::Any)
    }

    /// Exactly this type
    pub fn invariant(&self) -> TypeSpec {
        TypeSpec::exact(self.clone())
    }

    /// This type and all of its subtypes
    pub fn covariant(&self) -> TypeSpec {
        TypeSpec::covariant(self.clone())
    }
}

impl fmt::Display for CypherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CypherType::Any => write!(f, "Any"),
            CypherType::Boolean => write!(f, "Boolean"),
            CypherType::String => write!(f, "String"),
            CypherType::Number => write!(f, "Number"),
            CypherType::Integer => write!(f, "Integer"),
            CypherType::Float => write!(f, "Float"),
            CypherType::Map => write!(f, "Map"),
            CypherType::Node => write!(f, "Node"),
            CypherType::Relationship => write!(f, "Relationship"),
            CypherType::Path => write!(f, "Path"),
            CypherType::List(inner) => write!(f, "List<{}>", inner),
        }
    }
}

/// Failure to read a type name such as `List<Integer>`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown type `{0}`")]
pub struct TypeParseError(pub String);

impl FromStr for CypherType {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("list<") && lower.ends_with('>') {
            return trimmed["list<".len()..trimmed.len() - 1]
                .parse()
                .map(CypherType::list)
                .map_err(|_| TypeParseError(trimmed.to_string()));
        }
        match lower.as_str() {
            "any" => Ok(CypherType::Any),
            "boolean" => Ok(CypherType::Boolean),
            "string" => Ok(CypherType::String),
            "number" => Ok(CypherType::Number),
            "integer" => Ok(CypherType::Integer),
            "float" => Ok(CypherType::Float),
            "map" => Ok(CypherType::Map),
            "node" => Ok(CypherType::Node),
            "relationship" => Ok(CypherType::Relationship),
            "path" => Ok(CypherType::Path),
            _ => Err(TypeParseError(trimmed.to_string())),
        }
    }
}

impl TryFrom<String> for CypherType {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CypherType> for String {
    fn from(ty: CypherType) -> Self {
        ty.to_string()
    }
}
