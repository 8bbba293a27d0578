//! Error handling and display for the CLI.

use colored::Colorize;
use ordinal_store::StoreError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Either --template or --entity is required.")]
    MissingTemplate,

    #[error("Invalid value '{value}' for --format (expected 'table' or 'json').")]
    InvalidFormat { value: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    let store_err = err.downcast_ref::<StoreError>().or_else(|| {
        err.downcast_ref::<CliError>().and_then(|e| match e {
            CliError::Store(inner) => Some(inner),
            _ => None,
        })
    });

    if let Some(hint) = store_err.and_then(store_hint) {
        eprintln!("\n{}", format!("Hint: {hint}").yellow());
    }
}

/// Suggests a next step for common store failures.
pub fn store_hint(err: &StoreError) -> Option<&'static str> {
    if err.is_storage_unavailable() {
        Some("Check DATABASE_URL and that Postgres is reachable.")
    } else if err.is_not_configured() {
        Some("Set one with `ordctl template set <ENTITY> <TEMPLATE>`.")
    } else if matches!(err, StoreError::Query(_)) {
        Some("The schema may be missing. Run `ordctl migrate`.")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_hint() {
        let missing = StoreError::not_configured("Bug");
        assert!(store_hint(&missing).unwrap().contains("template set"));

        let exhausted = StoreError::SequenceExhausted { key: "Bug".into() };
        assert_eq!(store_hint(&exhausted), None);
    }
}
