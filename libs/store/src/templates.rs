//! Template configuration sources.
//!
//! Templates are populated out-of-band by operators. Allocation and
//! formatting only read them.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ordinal_id::EntityType;
use sqlx::{postgres::PgPool, postgres::PgRow, Row};
use tracing::info;

use crate::StoreError;

/// Read access to per-entity-type template text.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// Returns the raw template for `entity_type`, or `None` if unset.
    async fn read_template(&self, entity_type: &EntityType) -> Result<Option<String>, StoreError>;
}

/// A row from the identifier_templates table.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TemplateRow {
    pub entity_type: String,
    pub template: String,
    pub updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for TemplateRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            entity_type: row.try_get("entity_type")?,
            template: row.try_get("template")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Postgres-backed template configuration.
#[derive(Clone)]
pub struct PgTemplateStore {
    pool: PgPool,
}

impl PgTemplateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Sets the template for an entity type.
    ///
    /// Changing a template re-renders every existing entity of that type;
    /// running registries keep the old template until invalidated.
    pub async fn upsert(&self, entity_type: &EntityType, template: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO identifier_templates (entity_type, template)
            VALUES ($1, $2)
            ON CONFLICT (entity_type)
            DO UPDATE SET template = EXCLUDED.template, updated_at = now()
            "#,
        )
        .bind(entity_type.as_str())
        .bind(template)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        info!(entity_type = %entity_type, template, "Identifier template set");
        Ok(())
    }

    /// Returns the full row for an entity type.
    pub async fn get(&self, entity_type: &EntityType) -> Result<Option<TemplateRow>, StoreError> {
        sqlx::query_as::<_, TemplateRow>(
            r#"
            SELECT entity_type, template, updated_at
            FROM identifier_templates
            WHERE entity_type = $1
            "#,
        )
        .bind(entity_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    /// Removes the template for an entity type. Returns false if none existed.
    pub async fn delete(&self, entity_type: &EntityType) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM identifier_templates WHERE entity_type = $1")
            .bind(entity_type.as_str())
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all configured templates ordered by entity type.
    pub async fn list(&self) -> Result<Vec<TemplateRow>, StoreError> {
        sqlx::query_as::<_, TemplateRow>(
            r#"
            SELECT entity_type, template, updated_at
            FROM identifier_templates
            ORDER BY entity_type
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }
}

#[async_trait]
impl TemplateSource for PgTemplateStore {
    async fn read_template(&self, entity_type: &EntityType) -> Result<Option<String>, StoreError> {
        sqlx::query_scalar("SELECT template FROM identifier_templates WHERE entity_type = $1")
            .bind(entity_type.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }
}

/// Templates fixed at startup, e.g. from a config file.
///
/// ```toml
/// [templates]
/// Requirement = "REQ-{0000}"
/// TestCase = "TC-{n}"
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticTemplates {
    templates: HashMap<EntityType, String>,
}

#[derive(serde::Deserialize)]
struct TemplateFile {
    #[serde(default)]
    templates: HashMap<String, String>,
}

impl StaticTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a template.
    #[must_use]
    pub fn with(mut self, entity_type: EntityType, template: impl Into<String>) -> Self {
        self.templates.insert(entity_type, template.into());
        self
    }

    /// Parses a TOML document with a `[templates]` table.
    pub fn from_toml_str(s: &str) -> Result<Self, StoreError> {
        let file: TemplateFile = toml::from_str(s)?;
        let mut templates = HashMap::with_capacity(file.templates.len());
        for (entity_type, template) in file.templates {
            templates.insert(EntityType::parse(&entity_type)?, template);
        }
        Ok(Self { templates })
    }

    pub fn get(&self, entity_type: &EntityType) -> Option<&str> {
        self.templates.get(entity_type).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[async_trait]
impl TemplateSource for StaticTemplates {
    async fn read_template(&self, entity_type: &EntityType) -> Result<Option<String>, StoreError> {
        Ok(self.get(entity_type).map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml() {
        let templates = StaticTemplates::from_toml_str(
            r#"
            [templates]
            Requirement = "REQ-{0000}"
            TestCase = "TC-{n}"
            "#,
        )
        .unwrap();

        assert_eq!(templates.len(), 2);
        let kind = EntityType::parse("Requirement").unwrap();
        assert_eq!(templates.get(&kind), Some("REQ-{0000}"));
    }

    #[test]
    fn test_from_toml_without_table() {
        let templates = StaticTemplates::from_toml_str("").unwrap();
        assert!(templates.is_empty());
    }

    #[test]
    fn test_from_toml_rejects_empty_entity_type() {
        let err = StaticTemplates::from_toml_str("[templates]\n\"\" = \"X-{n}\"\n").unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }

    #[test]
    fn test_from_toml_rejects_bad_syntax() {
        let err = StaticTemplates::from_toml_str("[templates\n").unwrap_err();
        assert!(matches!(err, StoreError::InvalidToml(_)));
    }

    #[tokio::test]
    async fn test_static_source_reads() {
        let kind = EntityType::parse("User").unwrap();
        let templates = StaticTemplates::new().with(kind.clone(), "USR-{n}");
        assert_eq!(
            templates.read_template(&kind).await.unwrap().as_deref(),
            Some("USR-{n}")
        );
        let other = EntityType::parse("Bug").unwrap();
        assert_eq!(templates.read_template(&other).await.unwrap(), None);
    }
}
