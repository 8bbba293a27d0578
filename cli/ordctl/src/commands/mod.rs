//! CLI commands.

mod identifiers;
mod sequences;
mod templates;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ordinal_store::{Database, DbConfig, StaticTemplates};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::CliError;
use crate::output::{print_success, OutputFormat};

/// ordctl - manage human-readable sequence numbers and their templates.
#[derive(Debug, Parser)]
#[command(name = "ordctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (table or json).
    #[arg(long, global = true, default_value = "table")]
    format: String,

    /// Postgres connection URL.
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// TOML file with a [templates] table, used instead of the database for
    /// template lookups by `format` and `resolve`.
    #[arg(long, global = true, env = "ORDINAL_TEMPLATES")]
    templates: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, env = "ORDINAL_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply database migrations.
    Migrate,

    /// Manage identifier templates.
    Template(templates::TemplateCommand),

    /// Allocate the next sequence number for an entity type.
    Allocate(sequences::AllocateArgs),

    /// Show the last allocated sequence number without allocating.
    Current(sequences::CurrentArgs),

    /// Render a sequence number as a display identifier.
    Format(identifiers::FormatArgs),

    /// Interpret a search token as an exact number or free text.
    Resolve(identifiers::ResolveArgs),
}

/// Shared state handed to every command.
pub struct CommandContext {
    pub format: OutputFormat,
    database_url: Option<String>,
    templates: Option<PathBuf>,
}

impl CommandContext {
    /// Connect to the database configured by flags and environment.
    pub async fn database(&self) -> Result<Database> {
        let mut config = DbConfig::from_env();
        if let Some(url) = &self.database_url {
            config.database_url = url.clone();
        }
        let db = Database::connect(&config).await.map_err(CliError::from)?;
        Ok(db)
    }

    /// Load the templates file, if one was given.
    pub fn static_templates(&self) -> Result<Option<StaticTemplates>> {
        let Some(path) = &self.templates else {
            return Ok(None);
        };
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read templates file {}", path.display()))?;
        let templates = StaticTemplates::from_toml_str(&contents).map_err(CliError::from)?;
        Ok(Some(templates))
    }
}

impl Cli {
    /// Initialize tracing (prefer RUST_LOG, fall back to --log-level).
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level.clone()));

        let registry = tracing_subscriber::registry().with(filter);
        if self.log_json {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    pub async fn run(self) -> Result<()> {
        let format = parse_format(&self.format)?;
        let ctx = CommandContext {
            format,
            database_url: self.database_url,
            templates: self.templates,
        };

        match self.command {
            Commands::Migrate => {
                let db = ctx.database().await?;
                db.run_migrations().await.map_err(CliError::from)?;
                info!("Schema is up to date");
                print_success("Migrations applied", ctx.format);
                Ok(())
            }
            Commands::Template(cmd) => cmd.run(ctx).await,
            Commands::Allocate(args) => sequences::allocate(ctx, args).await,
            Commands::Current(args) => sequences::current(ctx, args).await,
            Commands::Format(args) => identifiers::format(ctx, args).await,
            Commands::Resolve(args) => identifiers::resolve(ctx, args).await,
        }
    }
}

fn parse_format(value: &str) -> Result<OutputFormat, CliError> {
    match value.to_ascii_lowercase().as_str() {
        "table" => Ok(OutputFormat::Table),
        "json" => Ok(OutputFormat::Json),
        _ => Err(CliError::InvalidFormat {
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format("json").unwrap(), OutputFormat::Json);
        assert_eq!(parse_format("TABLE").unwrap(), OutputFormat::Table);
        assert!(matches!(
            parse_format("yaml"),
            Err(CliError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_cli_parses_allocate() {
        let cli = Cli::try_parse_from([
            "ordctl",
            "allocate",
            "TestCase",
            "--scope",
            "projectX",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.format, "json");
        assert!(matches!(cli.command, Commands::Allocate(_)));
    }

    #[test]
    fn test_cli_verifies() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
