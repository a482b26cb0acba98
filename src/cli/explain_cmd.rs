//! Handler for the `quarry explain` subcommand.

use crate::diagnostics::explanation;

use super::CliError;

pub(crate) fn run_explain(code: &str) -> Result<(), CliError> {
    let code = code.trim().to_uppercase();
    let text = explanation(&code).ok_or_else(|| CliError::UnknownCode(code.clone()))?;
    println!("{}: {}", code, text);
    Ok(())
}
