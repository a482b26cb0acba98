//! Analysis configuration (quarry.toml)

use crate::semantics::SemanticContext;
use crate::types::{CypherType, TypeSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "quarry.toml";

/// Contents of a `quarry.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisSettings,

    /// Variables in scope before analysis starts
    #[serde(default)]
    pub variables: BTreeMap<String, DeclaredType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisSettings {
    /// Context top-level expressions are checked in
    #[serde(default)]
    pub context: SemanticContext,
}

/// A declared variable type: one type name or a list of alternatives. Each
/// named type includes its subtypes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeclaredType {
    One(CypherType),
    Alternatives(Vec<CypherType>),
}

impl DeclaredType {
    pub fn to_spec(&self) -> TypeSpec {
        match self {
            DeclaredType::One(ty) => ty.covariant(),
            DeclaredType::Alternatives(types) => types
                .iter()
                .fold(TypeSpec::none(), |acc, ty| acc.union(&ty.covariant())),
        }
    }
}

impl From<CypherType> for DeclaredType {
    fn from(ty: CypherType) -> Self {
        DeclaredType::One(ty)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Load from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Find the nearest `quarry.toml` at or above `start`
    pub fn discover(start: &Path) -> Option<PathBuf> {
        let mut dir = if start.is_file() {
            start.parent()?.to_path_buf()
        } else {
            start.to_path_buf()
        };
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Load the nearest config, or the defaults when there is none
    pub fn discover_and_load(start: &Path) -> Result<Self, ConfigError> {
        match Self::discover(start) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }
}
