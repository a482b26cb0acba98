//! Command-line interface for quarry
//!
//! Provides commands: check, deps, explain

mod check_cmd;
mod deps_cmd;
mod document;
mod explain_cmd;

pub use check_cmd::{check_document, CheckOptions, FileReport};
pub use document::QueryDocument;

use clap::{Parser, Subcommand};
use miette::Diagnostic as MietteDiagnostic;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

use crate::config::ConfigError;
use crate::semantics::{SemanticContext, SemanticError};

/// Quarry - semantic analysis for query expressions
#[derive(Parser, Debug)]
#[command(name = "quarry")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output diagnostics as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log analysis steps to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Type-check query documents
    Check {
        /// Files or directories to check
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Configuration file (defaults to the nearest quarry.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Context the expressions appear in
        #[arg(long, value_enum)]
        context: Option<SemanticContext>,

        /// Print the inferred type of every expression
        #[arg(long)]
        types: bool,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// List the variables each expression depends on
    Deps {
        /// Files or directories to inspect
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,
    },

    /// Explain an error or warning code in detail
    Explain {
        /// Code to explain (e.g., E1001, W0001)
        code: String,
    },
}

/// Failures that stop a command
#[derive(Debug, Error, MietteDiagnostic)]
pub enum CliError {
    #[error("failed to read {path}")]
    #[diagnostic(code(quarry::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a valid query document")]
    #[diagnostic(
        code(quarry::document),
        help("expected an object with an `expressions` array of expression trees")
    )]
    InvalidDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(quarry::config))]
    Config(#[from] ConfigError),

    #[error("invalid variable declaration in {path}: {source}")]
    #[diagnostic(code(quarry::declaration))]
    Declaration {
        path: PathBuf,
        source: SemanticError,
    },

    #[error("unknown code `{0}`")]
    #[diagnostic(code(quarry::explain), help("codes look like E1001 or W0001"))]
    UnknownCode(String),
}

impl Cli {
    /// Run the parsed command
    pub fn run(&self) -> Result<ExitCode, CliError> {
        match &self.command {
            Command::Check {
                paths,
                config,
                context,
                types,
                strict,
            } => {
                let options = CheckOptions {
                    config: config.clone(),
                    context: *context,
                    show_types: *types,
                    strict: *strict,
                };
                check_cmd::run_check(paths, &options, self.json)
            }
            Command::Deps { paths } => {
                deps_cmd::run_deps(paths, self.json)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Explain { code } => {
                explain_cmd::run_explain(code)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Expand directories into the `.json` documents below them
pub fn collect_documents(paths: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    let mut documents = Vec::new();
    for path in paths {
        if path.is_file() {
            documents.push(path.clone());
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = walkdir(path)?
                .into_iter()
                .filter(|entry| entry.extension().is_some_and(|ext| ext == "json"))
                .collect();
            found.sort();
            documents.extend(found);
        } else {
            return Err(CliError::Io {
                path: path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
            });
        }
    }
    Ok(documents)
}

/// Simple recursive directory walker
fn walkdir(path: &Path) -> Result<Vec<PathBuf>, CliError> {
    let io_error = |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut results = Vec::new();
    for entry in std::fs::read_dir(path).map_err(io_error)? {
        let entry_path = entry.map_err(io_error)?.path();
        if entry_path.is_file() {
            results.push(entry_path);
        } else if entry_path.is_dir() {
            results.extend(walkdir(&entry_path)?);
        }
    }
    Ok(results)
}
