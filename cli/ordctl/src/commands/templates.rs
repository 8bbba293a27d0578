//! Template commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use ordinal_id::{EntityType, IdentifierTemplate};
use ordinal_store::StoreError;
use serde::Serialize;
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{print_output, print_single, print_success, print_warning};

use super::CommandContext;

/// Template commands.
#[derive(Debug, Args)]
pub struct TemplateCommand {
    #[command(subcommand)]
    command: TemplateSubcommand,
}

#[derive(Debug, Subcommand)]
enum TemplateSubcommand {
    /// List configured templates.
    List,

    /// Show the template for an entity type.
    Get(EntityArgs),

    /// Set the template for an entity type.
    ///
    /// Existing entities re-render with the new template; running services
    /// pick it up once their registry cache is invalidated.
    Set(SetTemplateArgs),

    /// Remove the template for an entity type.
    Delete(EntityArgs),
}

#[derive(Debug, Args)]
struct EntityArgs {
    /// Entity type, e.g. Requirement.
    entity: String,
}

#[derive(Debug, Args)]
struct SetTemplateArgs {
    /// Entity type, e.g. Requirement.
    entity: String,

    /// Display template with one placeholder, e.g. "REQ-{0000}".
    template: String,
}

#[derive(Debug, Serialize, Tabled)]
struct TemplateView {
    #[tabled(rename = "Entity")]
    entity_type: String,

    #[tabled(rename = "Template")]
    template: String,

    #[tabled(rename = "Prefix")]
    prefix: String,

    #[tabled(rename = "Placeholders")]
    placeholders: usize,

    #[tabled(rename = "Updated")]
    updated_at: String,
}

impl TemplateView {
    fn new(entity_type: String, template: String, updated_at: String) -> Self {
        let parsed = IdentifierTemplate::parse(&template);
        Self {
            entity_type,
            prefix: parsed.prefix().to_string(),
            placeholders: parsed.placeholder_count(),
            template,
            updated_at,
        }
    }
}

impl TemplateCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            TemplateSubcommand::List => list_templates(ctx).await,
            TemplateSubcommand::Get(args) => get_template(ctx, args).await,
            TemplateSubcommand::Set(args) => set_template(ctx, args).await,
            TemplateSubcommand::Delete(args) => delete_template(ctx, args).await,
        }
    }
}

async fn list_templates(ctx: CommandContext) -> Result<()> {
    let store = ctx.database().await?.template_store();
    let rows = store.list().await.map_err(CliError::from)?;

    let views: Vec<TemplateView> = rows
        .into_iter()
        .map(|row| TemplateView::new(row.entity_type, row.template, row.updated_at.to_rfc3339()))
        .collect();
    print_output(&views, ctx.format);
    Ok(())
}

async fn get_template(ctx: CommandContext, args: EntityArgs) -> Result<()> {
    let entity_type = EntityType::parse(&args.entity)?;
    let store = ctx.database().await?.template_store();

    let row = store
        .get(&entity_type)
        .await
        .map_err(CliError::from)?
        .ok_or_else(|| CliError::from(StoreError::not_configured(&entity_type)))?;

    let view = TemplateView::new(row.entity_type, row.template, row.updated_at.to_rfc3339());
    print_single(&view, ctx.format);
    Ok(())
}

async fn set_template(ctx: CommandContext, args: SetTemplateArgs) -> Result<()> {
    let entity_type = EntityType::parse(&args.entity)?;

    let parsed = IdentifierTemplate::parse(&args.template);
    match parsed.placeholder_count() {
        1 => {}
        0 => print_warning(&format!(
            "template '{}' has no placeholder; every {} will display identically",
            args.template, entity_type
        )),
        n => print_warning(&format!(
            "template '{}' has {n} placeholders; only the first is substituted",
            args.template
        )),
    }

    let store = ctx.database().await?.template_store();
    store
        .upsert(&entity_type, &args.template)
        .await
        .map_err(CliError::from)?;

    print_success(
        &format!("Template for {} set to '{}'", entity_type, args.template),
        ctx.format,
    );
    Ok(())
}

async fn delete_template(ctx: CommandContext, args: EntityArgs) -> Result<()> {
    let entity_type = EntityType::parse(&args.entity)?;
    let store = ctx.database().await?.template_store();

    if !store.delete(&entity_type).await.map_err(CliError::from)? {
        return Err(CliError::from(StoreError::not_configured(&entity_type)).into());
    }

    print_success(&format!("Template for {entity_type} removed"), ctx.format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_view_reports_prefix() {
        let view = TemplateView::new("Requirement".into(), "REQ-{0000}".into(), String::new());
        assert_eq!(view.prefix, "REQ-");
        assert_eq!(view.placeholders, 1);
    }
}
