//! Operator signature catalogs

use super::typing::Signature;
use crate::ast::{InfixOp, PostfixOp, PrefixOp};
use crate::types::{CypherType, TypeSpec};

use CypherType::{Any, Boolean, Float, Integer};

/// Integer arithmetic stays Integer, anything involving a Float is Float
fn numeric() -> Vec<Signature> {
    vec![
        Signature::new(vec![Integer, Integer], Integer),
        Signature::new(vec![Integer, Float], Float),
        Signature::new(vec![Float, Integer], Float),
        Signature::new(vec![Float, Float], Float),
    ]
}

impl PrefixOp {
    pub fn signatures(&self) -> Vec<Signature> {
        match self {
            PrefixOp::Not => vec![Signature::new(vec![Boolean], Boolean)],
            PrefixOp::Negate | PrefixOp::Plus => vec![
                Signature::new(vec![Integer], Integer),
                Signature::new(vec![Float], Float),
            ],
        }
    }
}

impl PostfixOp {
    pub fn signatures(&self) -> Vec<Signature> {
        match self {
            PostfixOp::IsNull | PostfixOp::IsNotNull => vec![Signature::new(vec![Any], Boolean)],
        }
    }
}

impl InfixOp {
    pub fn signatures(&self) -> Vec<Signature> {
        match self {
            InfixOp::And | InfixOp::Or | InfixOp::Xor => {
                vec![Signature::new(vec![Boolean, Boolean], Boolean)]
            }
            InfixOp::Eq
            | InfixOp::NotEq
            | InfixOp::Lt
            | InfixOp::LtEq
            | InfixOp::Gt
            | InfixOp::GtEq => vec![Signature::new(vec![Any, Any], Boolean)],
            InfixOp::Add => {
                let any_list = CypherType::list(Any);
                let mut signatures = numeric();
                signatures.push(Signature::new(
                    vec![CypherType::String, CypherType::String],
                    CypherType::String,
                ));
                signatures.push(Signature::new(
                    vec![any_list.clone(), any_list.clone()],
                    TypeSpec::covariant(any_list),
                ));
                signatures
            }
            InfixOp::Sub | InfixOp::Mul | InfixOp::Div | InfixOp::Mod => numeric(),
            InfixOp::Pow => vec![Signature::new(vec![Float, Float], Float)],
            InfixOp::StartsWith | InfixOp::EndsWith | InfixOp::Contains => vec![Signature::new(
                vec![CypherType::String, CypherType::String],
                Boolean,
            )],
            InfixOp::In => vec![Signature::new(vec![Any, CypherType::list(Any)], Boolean)],
        }
    }
}
