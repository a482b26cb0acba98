//! Handler for the `quarry check` subcommand.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::Config;
use crate::diagnostics::{warnings, Diagnostic, DiagnosticBag};
use crate::semantics::{Analyzer, SemanticContext};
use crate::types::TypeSpec;

use super::{collect_documents, CliError, QueryDocument};

/// Flags of `quarry check`
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub config: Option<PathBuf>,
    pub context: Option<SemanticContext>,
    pub show_types: bool,
    pub strict: bool,
}

/// Result of checking one document
#[derive(Debug, Clone)]
pub struct FileReport {
    pub diagnostics: DiagnosticBag,
    /// Root type of each expression, in document order
    pub types: Vec<TypeSpec>,
    /// Variables read by any expression
    pub dependencies: BTreeSet<String>,
}

#[tracing::instrument(skip_all, fields(paths = paths.len()))]
pub(crate) fn run_check(
    paths: &[PathBuf],
    options: &CheckOptions,
    json: bool,
) -> Result<ExitCode, CliError> {
    let files = collect_documents(paths)?;
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        let document = QueryDocument::load(file)?;
        let config = match &options.config {
            Some(path) => Config::load(path)?,
            None => Config::discover_and_load(file)?,
        };
        let report = check_document(file, &document, &config, options.context)?;

        for diagnostic in report.diagnostics.diagnostics() {
            if json {
                println!("{}", diagnostic.to_json());
            } else {
                eprintln!("{}", diagnostic.to_human_readable(document.source.as_deref()));
            }
        }

        if options.show_types {
            for (index, ty) in report.types.iter().enumerate() {
                if json {
                    let line = serde_json::json!({
                        "file": file.display().to_string(),
                        "expression": index,
                        "type": ty.to_string(),
                    });
                    println!("{}", line);
                } else {
                    println!("{}#{}: {}", file.display(), index, ty);
                }
            }
        }

        total_errors += report.diagnostics.error_count();
        total_warnings += report.diagnostics.warning_count();
    }

    let has_issues = total_errors > 0 || (options.strict && total_warnings > 0);

    if has_issues {
        let mut parts = Vec::new();
        if total_errors > 0 {
            parts.push(format!("{} error(s)", total_errors));
        }
        if total_warnings > 0 {
            if options.strict {
                parts.push(format!(
                    "{} warning(s) [treated as errors with --strict]",
                    total_warnings
                ));
            } else {
                parts.push(format!("{} warning(s)", total_warnings));
            }
        }
        eprintln!("\nChecked {} file(s), found {}", files.len(), parts.join(", "));
        Ok(ExitCode::FAILURE)
    } else {
        if total_warnings > 0 {
            println!(
                "Checked {} file(s), no errors ({} warning(s))",
                files.len(),
                total_warnings
            );
        } else {
            println!("Checked {} file(s), no errors found", files.len());
        }
        Ok(ExitCode::SUCCESS)
    }
}

/// Analyse every expression of a document. Document variables are declared
/// on top of the configured ones; `context` overrides the configured context.
pub fn check_document(
    path: &Path,
    document: &QueryDocument,
    config: &Config,
    context: Option<SemanticContext>,
) -> Result<FileReport, CliError> {
    let mut config = config.clone();
    config.variables.extend(document.variables.clone());
    let analyzer = Analyzer::from_config(&config).map_err(|source| CliError::Declaration {
        path: path.to_path_buf(),
        source,
    })?;
    let ctx = context.unwrap_or(config.analysis.context);

    let mut diagnostics = DiagnosticBag::new();
    let mut types = Vec::with_capacity(document.expressions.len());
    let mut dependencies = BTreeSet::new();

    for expr in &document.expressions {
        let analysis = analyzer.analyze(expr, ctx);
        diagnostics.merge(analysis.diagnostics(Some(path)));
        types.push(analysis.root_type());
        dependencies.extend(analysis.dependencies());
    }

    for name in document.variables.keys() {
        if !dependencies.contains(name) {
            diagnostics.push(
                Diagnostic::warning(warnings::UNUSED_VARIABLE)
                    .message(format!("Variable `{}` is declared but never used", name))
                    .file(path)
                    .build(),
            );
        }
    }

    tracing::debug!(
        path = %path.display(),
        errors = diagnostics.error_count(),
        warnings = diagnostics.warning_count(),
        "checked document"
    );

    Ok(FileReport {
        diagnostics,
        types,
        dependencies,
    })
}
