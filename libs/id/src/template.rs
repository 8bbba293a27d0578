//! Identifier templates and the formatter.
//!
//! A template is operator-authored text with one placeholder, e.g.
//! `REQ-{0000}`. The placeholder is the first `{...}` span whose content is
//! one or more characters that are neither braces nor whitespace. Its
//! content is an opaque marker; `{0000}` does not mean zero padding.
//!
//! Templates are parsed once. Formatting and search resolution then work on
//! the recorded prefix and suffix without rescanning the text.

use std::ops::Range;

/// A parsed display template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentifierTemplate {
    source: String,
    placeholder: Option<Range<usize>>,
    placeholder_count: usize,
}

impl IdentifierTemplate {
    /// Parses a template. Never fails: a template with no placeholder
    /// formats to itself, and only the first of several placeholders is
    /// substituted.
    #[must_use]
    pub fn parse(template: &str) -> Self {
        let spans = placeholder_spans(template);
        Self {
            source: template.to_string(),
            placeholder_count: spans.len(),
            placeholder: spans.into_iter().next(),
        }
    }

    /// The template text as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Literal text before the placeholder (the whole template if none).
    #[must_use]
    pub fn prefix(&self) -> &str {
        match &self.placeholder {
            Some(span) => &self.source[..span.start],
            None => &self.source,
        }
    }

    /// Literal text after the placeholder, including any later placeholders.
    #[must_use]
    pub fn suffix(&self) -> &str {
        match &self.placeholder {
            Some(span) => &self.source[span.end..],
            None => "",
        }
    }

    /// The substituted marker, e.g. `{0000}`.
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_ref().map(|span| &self.source[span.clone()])
    }

    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.placeholder_count
    }

    #[must_use]
    pub fn has_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    /// True when the template has exactly one placeholder.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.placeholder_count == 1
    }

    /// Renders `value` into the first placeholder.
    #[must_use]
    pub fn format(&self, value: i64) -> String {
        match &self.placeholder {
            Some(span) => {
                let prefix = &self.source[..span.start];
                let suffix = &self.source[span.end..];
                let mut out = String::with_capacity(self.source.len() + 20);
                out.push_str(prefix);
                out.push_str(&value.to_string());
                out.push_str(suffix);
                out
            }
            None => self.source.clone(),
        }
    }
}

/// Parses `template` and renders `value` into it.
///
/// Prefer parsing once with [`IdentifierTemplate::parse`] when formatting
/// many values.
#[must_use]
pub fn format_identifier(value: i64, template: &str) -> String {
    IdentifierTemplate::parse(template).format(value)
}

/// Byte ranges of every placeholder, in order, non-overlapping.
fn placeholder_spans(s: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut open: Option<usize> = None;

    for (i, c) in s.char_indices() {
        match c {
            '{' => open = Some(i),
            '}' => {
                if let Some(start) = open.take() {
                    // `{}` has no content and stays literal
                    if i > start + 1 {
                        spans.push(start..i + 1);
                    }
                }
            }
            c if c.is_whitespace() => open = None,
            _ => {}
        }
    }

    spans
}

impl std::fmt::Display for IdentifierTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for IdentifierTemplate {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for IdentifierTemplate {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl serde::Serialize for IdentifierTemplate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> serde::Deserialize<'de> for IdentifierTemplate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_format_req_template() {
        let template = IdentifierTemplate::parse("REQ-{0000}");
        assert_eq!(template.format(42), "REQ-42");
        assert_eq!(template.prefix(), "REQ-");
        assert_eq!(template.suffix(), "");
        assert_eq!(template.placeholder(), Some("{0000}"));
        assert!(template.is_well_formed());
    }

    #[test]
    fn test_format_no_placeholder_returns_template() {
        let template = IdentifierTemplate::parse("TICKET");
        assert_eq!(template.format(7), "TICKET");
        assert_eq!(template.prefix(), "TICKET");
        assert!(!template.has_placeholder());
        assert_eq!(template.placeholder_count(), 0);
    }

    #[test]
    fn test_format_only_first_placeholder() {
        let template = IdentifierTemplate::parse("A{0}-B{0}");
        assert_eq!(template.format(3), "A3-B{0}");
        assert_eq!(template.placeholder_count(), 2);
        assert!(!template.is_well_formed());
        assert_eq!(template.suffix(), "-B{0}");
    }

    #[rstest]
    #[case("{}", 0)]
    #[case("{ }", 0)]
    #[case("{a b}", 0)]
    #[case("{n}", 1)]
    #[case("{{seq}", 1)]
    #[case("TC-{#}/{#}", 2)]
    fn test_placeholder_detection(#[case] template: &str, #[case] expected: usize) {
        assert_eq!(IdentifierTemplate::parse(template).placeholder_count(), expected);
    }

    #[test]
    fn test_nested_brace_uses_innermost_open() {
        let template = IdentifierTemplate::parse("X{{seq}");
        assert_eq!(template.prefix(), "X{");
        assert_eq!(template.format(9), "X{9");
    }

    #[test]
    fn test_format_with_suffix() {
        let template = IdentifierTemplate::parse("BUG-{n}-é");
        assert_eq!(template.format(100), "BUG-100-é");
        assert_eq!(template.suffix(), "-é");
    }

    #[test]
    fn test_format_identifier_helper() {
        assert_eq!(format_identifier(0, "{n}"), "0");
    }

    #[test]
    fn test_template_json_roundtrip() {
        let template = IdentifierTemplate::parse("REQ-{0000}");
        let json = serde_json::to_string(&template).unwrap();
        assert_eq!(json, r#""REQ-{0000}""#);
        let parsed: IdentifierTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, template);
    }

    proptest! {
        #[test]
        fn format_is_prefix_value_suffix(
            prefix in "[A-Za-z_#-]{0,8}",
            marker in "[0-9a-z]{1,6}",
            suffix in "[A-Za-z_#-]{0,4}",
            value in 0i64..=i64::MAX,
        ) {
            let text = format!("{prefix}{{{marker}}}{suffix}");
            let template = IdentifierTemplate::parse(&text);
            prop_assert_eq!(template.format(value), format!("{prefix}{value}{suffix}"));
        }
    }
}
