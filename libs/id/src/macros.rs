//! Macros for defining validated label types.

/// Maximum stored length, in bytes, of any label.
pub const MAX_LABEL_LEN: usize = 128;

/// Macro to define a trimmed, non-empty string label.
///
/// This generates a newtype wrapper around `String` with:
/// - `parse()` that trims, rejects empty input, and enforces [`MAX_LABEL_LEN`]
/// - `as_str()` accessor
/// - `Display`, `FromStr`, `AsRef<str>`, and `TryFrom<&str>` implementations
/// - `Serialize` and `Deserialize` implementations that validate on input
///
/// # Example
///
/// ```ignore
/// define_label!(EntityType, "entity type", EmptyEntityType);
///
/// let kind: EntityType = "Requirement".parse()?;
/// ```
#[macro_export]
macro_rules! define_label {
    ($name:ident, $field:literal, $empty:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Parses a label, trimming surrounding whitespace.
            pub fn parse(s: &str) -> Result<Self, $crate::IdError> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err($crate::IdError::$empty);
                }
                if trimmed.len() > $crate::MAX_LABEL_LEN {
                    return Err($crate::IdError::TooLong {
                        field: $field,
                        max: $crate::MAX_LABEL_LEN,
                    });
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Returns the label text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = $crate::IdError;

            fn try_from(s: &str) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}
