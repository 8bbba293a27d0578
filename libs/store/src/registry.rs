//! Format registry.
//!
//! Resolves an entity type to its parsed template, parsing each template once
//! when it is first loaded. Unlike counters, templates are read-only
//! configuration and safe to cache in-process.

use std::collections::HashMap;
use std::sync::Arc;

use ordinal_id::{resolve_raw, resolve_search_token, EntityType, IdentifierTemplate, SearchToken};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::templates::TemplateSource;
use crate::StoreError;

/// Per-entity-type template lookup with a parse cache.
pub struct FormatRegistry<S> {
    source: S,
    cache: RwLock<HashMap<EntityType, Arc<IdentifierTemplate>>>,
}

impl<S: TemplateSource> FormatRegistry<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the parsed template for `entity_type`.
    ///
    /// # Errors
    ///
    /// `NotConfigured` if the source has no template; source errors such as
    /// `StorageUnavailable` propagate. Missing templates are not cached, so a
    /// template configured later is picked up on the next call.
    pub async fn get_template(
        &self,
        entity_type: &EntityType,
    ) -> Result<Arc<IdentifierTemplate>, StoreError> {
        if let Some(template) = self.cache.read().await.get(entity_type) {
            return Ok(Arc::clone(template));
        }

        let text = self
            .source
            .read_template(entity_type)
            .await?
            .ok_or_else(|| StoreError::not_configured(entity_type))?;

        let template = IdentifierTemplate::parse(&text);
        if !template.is_well_formed() {
            warn!(
                entity_type = %entity_type,
                template = %template,
                placeholders = template.placeholder_count(),
                "Identifier template should have exactly one placeholder"
            );
        }
        debug!(entity_type = %entity_type, template = %template, "Loaded identifier template");

        let mut cache = self.cache.write().await;
        let entry = cache
            .entry(entity_type.clone())
            .or_insert_with(|| Arc::new(template));
        Ok(Arc::clone(entry))
    }

    /// Formats `value` with the entity type's template.
    pub async fn format(&self, entity_type: &EntityType, value: i64) -> Result<String, StoreError> {
        Ok(self.get_template(entity_type).await?.format(value))
    }

    /// Like [`format`](Self::format), but shows the raw integer when no
    /// template is configured.
    pub async fn display(&self, entity_type: &EntityType, value: i64) -> Result<String, StoreError> {
        match self.get_template(entity_type).await {
            Ok(template) => Ok(template.format(value)),
            Err(e) if e.is_not_configured() => Ok(value.to_string()),
            Err(e) => Err(e),
        }
    }

    /// Resolves a search token for `entity_type`, treating it as a raw
    /// integer or free text when no template is configured.
    pub async fn resolve(&self, entity_type: &EntityType, raw: &str) -> Result<SearchToken, StoreError> {
        match self.get_template(entity_type).await {
            Ok(template) => Ok(resolve_search_token(raw, &template)),
            Err(e) if e.is_not_configured() => Ok(resolve_raw(raw)),
            Err(e) => Err(e),
        }
    }

    /// Drops the cached template so the next lookup rereads the source.
    pub async fn invalidate(&self, entity_type: &EntityType) {
        self.cache.write().await.remove(entity_type);
    }

    /// Drops every cached template.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }
}
