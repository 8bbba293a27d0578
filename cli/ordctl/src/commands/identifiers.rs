//! Format and resolve commands.
//!
//! Both are pure once a template is known; the template comes from
//! `--template`, the `--templates` file, or the database, in that order.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use ordinal_id::{resolve_search_token, EntityType, IdentifierTemplate, SearchToken};
use ordinal_store::FormatRegistry;
use serde::Serialize;
use tabled::Tabled;

use crate::error::CliError;
use crate::output::print_single;

use super::CommandContext;

#[derive(Debug, Args)]
pub struct FormatArgs {
    /// Sequence number to render.
    value: i64,

    #[command(flatten)]
    template: TemplateArgs,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Search token as typed by a user, e.g. "req-42".
    token: String,

    #[command(flatten)]
    template: TemplateArgs,
}

#[derive(Debug, Args)]
struct TemplateArgs {
    /// Template to use directly, e.g. "REQ-{0000}".
    #[arg(long, conflicts_with = "entity")]
    template: Option<String>,

    /// Entity type whose configured template to use.
    #[arg(long)]
    entity: Option<String>,
}

#[derive(Debug, Serialize, Tabled)]
struct FormatView {
    #[tabled(rename = "Template")]
    template: String,

    #[tabled(rename = "Value")]
    value: i64,

    #[tabled(rename = "Identifier")]
    identifier: String,
}

#[derive(Debug, Serialize, Tabled)]
struct ResolveView {
    #[tabled(rename = "Token")]
    token: String,

    #[tabled(rename = "Kind")]
    kind: &'static str,

    #[tabled(rename = "Value")]
    value: String,
}

impl From<(String, SearchToken)> for ResolveView {
    fn from((token, resolved): (String, SearchToken)) -> Self {
        let (kind, value) = match resolved {
            SearchToken::Exact(n) => ("exact", n.to_string()),
            SearchToken::Text(s) => ("text", s),
        };
        Self { token, kind, value }
    }
}

async fn load_template(ctx: &CommandContext, args: &TemplateArgs) -> Result<Arc<IdentifierTemplate>> {
    if let Some(template) = &args.template {
        return Ok(Arc::new(IdentifierTemplate::parse(template)));
    }

    let Some(entity) = &args.entity else {
        return Err(CliError::MissingTemplate.into());
    };
    let entity_type = EntityType::parse(entity)?;

    let template = match ctx.static_templates()? {
        Some(templates) => FormatRegistry::new(templates).get_template(&entity_type).await,
        None => {
            let db = ctx.database().await?;
            FormatRegistry::new(db.template_store())
                .get_template(&entity_type)
                .await
        }
    };

    Ok(template.map_err(CliError::from)?)
}

pub async fn format(ctx: CommandContext, args: FormatArgs) -> Result<()> {
    let template = load_template(&ctx, &args.template).await?;

    let view = FormatView {
        template: template.to_string(),
        value: args.value,
        identifier: template.format(args.value),
    };
    print_single(&view, ctx.format);
    Ok(())
}

pub async fn resolve(ctx: CommandContext, args: ResolveArgs) -> Result<()> {
    let template = load_template(&ctx, &args.template).await?;
    let resolved = resolve_search_token(&args.token, &template);

    print_single(&ResolveView::from((args.token, resolved)), ctx.format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_view_exact() {
        let view = ResolveView::from(("REQ-42".to_string(), SearchToken::Exact(42)));
        assert_eq!(view.kind, "exact");
        assert_eq!(view.value, "42");
    }

    #[test]
    fn test_resolve_view_text() {
        let view = ResolveView::from(("Login bug".to_string(), SearchToken::Text("Login bug".into())));
        assert_eq!(view.kind, "text");
        assert_eq!(view.value, "Login bug");
    }
}
