//! Handler for the `quarry deps` subcommand.

use std::path::PathBuf;

use crate::semantics::dependencies;

use super::{collect_documents, CliError, QueryDocument};

#[tracing::instrument(skip_all, fields(paths = paths.len()))]
pub(crate) fn run_deps(paths: &[PathBuf], json: bool) -> Result<(), CliError> {
    for file in collect_documents(paths)? {
        let document = QueryDocument::load(&file)?;
        for (index, expr) in document.expressions.iter().enumerate() {
            let names: Vec<String> = dependencies(expr).into_iter().collect();
            if json {
                let line = serde_json::json!({
                    "file": file.display().to_string(),
                    "expression": index,
                    "dependencies": names,
                });
                println!("{}", line);
            } else if names.is_empty() {
                println!("{}#{}: (none)", file.display(), index);
            } else {
                println!("{}#{}: {}", file.display(), index, names.join(", "));
            }
        }
    }
    Ok(())
}
