//! Sequence keys and sequence numbers.
//!
//! A counter is keyed by an entity type and an optional scope. Entities
//! numbered globally (users) use no scope; entities numbered per parent
//! (requirements per project) carry the parent's id as scope.

use crate::define_label;

define_label!(EntityType, "entity type", EmptyEntityType);
define_label!(ScopeId, "scope id", EmptyScope);

// =============================================================================
// Sequence Key
// =============================================================================

/// Key of a single independent counter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct SequenceKey {
    entity_type: EntityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<ScopeId>,
}

impl SequenceKey {
    /// A counter shared by every entity of this type.
    #[must_use]
    pub fn global(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            scope: None,
        }
    }

    /// A counter partitioned by `scope`.
    #[must_use]
    pub fn scoped(entity_type: EntityType, scope: ScopeId) -> Self {
        Self {
            entity_type,
            scope: Some(scope),
        }
    }

    /// Builds a key from raw strings, validating both parts.
    pub fn parse(entity_type: &str, scope: Option<&str>) -> Result<Self, crate::IdError> {
        let entity_type = EntityType::parse(entity_type)?;
        let scope = scope.map(ScopeId::parse).transpose()?;
        Ok(Self { entity_type, scope })
    }

    #[must_use]
    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    #[must_use]
    pub fn scope(&self) -> Option<&ScopeId> {
        self.scope.as_ref()
    }

    /// Scope column value used by durable stores; the global scope is `""`.
    ///
    /// `ScopeId` is never empty, so this cannot collide with a real scope.
    #[must_use]
    pub fn storage_scope(&self) -> &str {
        self.scope.as_ref().map_or("", ScopeId::as_str)
    }
}

impl std::fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}@{}", self.entity_type, scope),
            None => write!(f, "{}", self.entity_type),
        }
    }
}

// =============================================================================
// Sequence Number
// =============================================================================

/// A number handed out by a sequence store.
///
/// Stored as `BIGINT`, so backed by `i64`. Allocated values start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceNumber(i64);

impl SequenceNumber {
    /// The first number allocated for any key.
    pub const FIRST: Self = Self(1);

    /// Creates a new SequenceNumber from an i64.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying i64 value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SequenceNumber {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<SequenceNumber> for i64 {
    fn from(seq: SequenceNumber) -> Self {
        seq.0
    }
}

impl serde::Serialize for SequenceNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for SequenceNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IdError;

    #[test]
    fn test_entity_type_trims() {
        let kind: EntityType = "  Requirement ".parse().unwrap();
        assert_eq!(kind.as_str(), "Requirement");
    }

    #[test]
    fn test_entity_type_empty() {
        let result: Result<EntityType, _> = "   ".parse();
        assert_eq!(result.unwrap_err(), IdError::EmptyEntityType);
    }

    #[test]
    fn test_scope_empty() {
        let result = SequenceKey::parse("Requirement", Some(""));
        assert_eq!(result.unwrap_err(), IdError::EmptyScope);
    }

    #[test]
    fn test_label_too_long() {
        let long = "x".repeat(crate::MAX_LABEL_LEN + 1);
        let err = EntityType::parse(&long).unwrap_err();
        assert!(matches!(err, IdError::TooLong { field: "entity type", .. }));
    }

    #[test]
    fn test_global_and_scoped_keys_differ() {
        let kind = EntityType::parse("Requirement").unwrap();
        let global = SequenceKey::global(kind.clone());
        let scoped = SequenceKey::scoped(kind, ScopeId::parse("projectX").unwrap());
        assert_ne!(global, scoped);
        assert_eq!(global.storage_scope(), "");
        assert_eq!(scoped.storage_scope(), "projectX");
    }

    #[test]
    fn test_key_display() {
        let key = SequenceKey::parse("TestCase", Some("projectX")).unwrap();
        assert_eq!(key.to_string(), "TestCase@projectX");
        let key = SequenceKey::parse("User", None).unwrap();
        assert_eq!(key.to_string(), "User");
    }

    #[test]
    fn test_key_json_omits_global_scope() {
        let key = SequenceKey::parse("User", None).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"{"entity_type":"User"}"#);
        let parsed: SequenceKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_key_json_rejects_empty_entity_type() {
        let result: Result<SequenceKey, _> = serde_json::from_str(r#"{"entity_type":""}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_sequence_number_json() {
        let seq = SequenceNumber::new(42);
        assert_eq!(serde_json::to_string(&seq).unwrap(), "42");
        assert_eq!(SequenceNumber::FIRST.value(), 1);
    }
}
