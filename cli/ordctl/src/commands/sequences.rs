//! Sequence commands.

use anyhow::Result;
use clap::Args;
use ordinal_id::SequenceKey;
use ordinal_store::{FormatRegistry, SequenceStore, StoreError};
use serde::Serialize;
use tabled::Tabled;
use tracing::{debug, warn};

use crate::error::{store_hint, CliError};
use crate::output::{print_single, print_warning};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct AllocateArgs {
    /// Entity type, e.g. Requirement.
    entity: String,

    /// Scope id (e.g. a project id). Omit for globally numbered entities.
    #[arg(long)]
    scope: Option<String>,
}

#[derive(Debug, Args)]
pub struct CurrentArgs {
    /// Entity type, e.g. Requirement.
    entity: String,

    /// Scope id. Omit for globally numbered entities.
    #[arg(long)]
    scope: Option<String>,
}

#[derive(Debug, Serialize, Tabled)]
struct SequenceView {
    #[tabled(rename = "Entity")]
    entity_type: String,

    #[tabled(rename = "Scope")]
    scope: String,

    #[tabled(rename = "Value")]
    value: i64,

    #[tabled(rename = "Identifier")]
    identifier: String,
}

/// Allocates one number. Never retried: a failed call may or may not have
/// consumed a number.
///
/// Once the number is allocated it is always printed, even if rendering the
/// identifier fails.
pub async fn allocate(ctx: CommandContext, args: AllocateArgs) -> Result<()> {
    let key = SequenceKey::parse(&args.entity, args.scope.as_deref())?;
    let db = ctx.database().await?;

    let number = db
        .sequence_store()
        .allocate(&key)
        .await
        .map_err(CliError::from)?;
    debug!(key = %key, number = number.value(), "Allocated sequence number");

    let registry = FormatRegistry::new(db.template_store());
    let rendered = registry.display(key.entity_type(), number.value()).await;
    let identifier = identifier_or_raw(rendered, number.value());

    print_single(&view(&key, number.value(), identifier), ctx.format);
    Ok(())
}

pub async fn current(ctx: CommandContext, args: CurrentArgs) -> Result<()> {
    let key = SequenceKey::parse(&args.entity, args.scope.as_deref())?;
    let db = ctx.database().await?;

    let value = db
        .sequence_store()
        .current(&key)
        .await
        .map_err(CliError::from)?
        .map_or(0, |n| n.value());

    let registry = FormatRegistry::new(db.template_store());
    let identifier = if value == 0 {
        "-".to_string()
    } else {
        registry
            .display(key.entity_type(), value)
            .await
            .map_err(CliError::from)?
    };

    print_single(&view(&key, value, identifier), ctx.format);
    Ok(())
}

/// Falls back to the bare number when the identifier cannot be rendered.
fn identifier_or_raw(rendered: Result<String, StoreError>, value: i64) -> String {
    match rendered {
        Ok(identifier) => identifier,
        Err(err) => {
            warn!(error = %err, value, "Failed to render identifier");
            let mut message = format!("number {value} was allocated but could not be rendered: {err}");
            if let Some(hint) = store_hint(&err) {
                message.push_str(&format!(" ({hint})"));
            }
            print_warning(&message);
            value.to_string()
        }
    }
}

fn view(key: &SequenceKey, value: i64, identifier: String) -> SequenceView {
    SequenceView {
        entity_type: key.entity_type().to_string(),
        scope: key.scope().map_or_else(|| "-".to_string(), |s| s.to_string()),
        value,
        identifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordinal_id::IdError;

    #[test]
    fn test_identifier_or_raw_keeps_rendered() {
        assert_eq!(identifier_or_raw(Ok("REQ-7".to_string()), 7), "REQ-7");
    }

    #[test]
    fn test_identifier_or_raw_falls_back_on_error() {
        let err = StoreError::InvalidKey(IdError::EmptyEntityType);
        assert_eq!(identifier_or_raw(Err(err), 42), "42");

        let err = StoreError::not_configured("Bug");
        assert_eq!(identifier_or_raw(Err(err), 3), "3");
    }
}
