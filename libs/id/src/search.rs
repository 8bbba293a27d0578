//! Search token translation.
//!
//! A user typing `REQ-42` into a search box means "the entity numbered 42",
//! not "anything containing the text REQ-42". This module decides which of
//! the two a token is, using the template's fixed prefix and suffix.
//!
//! A token that matches the prefix but has a non-numeric remainder
//! (`REQ-abc`) falls back to free text rather than an exact match that can
//! never succeed.
//!
//! Case-insensitive matching compares full Unicode lowercase mappings, so a
//! prefix such as `İD-` also matches its lowercased form `i̇d-`.

use crate::IdentifierTemplate;

/// Outcome of interpreting a search token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SearchToken {
    /// Match entities whose stored sequence number equals this value.
    Exact(i64),
    /// Free-text match on other fields, with the token as typed.
    Text(String),
}

impl SearchToken {
    #[must_use]
    pub fn is_exact(&self) -> bool {
        matches!(self, SearchToken::Exact(_))
    }

    /// Returns the sequence number for exact matches.
    #[must_use]
    pub fn exact_value(&self) -> Option<i64> {
        match self {
            SearchToken::Exact(value) => Some(*value),
            SearchToken::Text(_) => None,
        }
    }
}

/// Resolves a raw search token against a display template.
///
/// The token is matched as typed first, so templates with leading or
/// trailing whitespace still recognise their own output. Failing that, the
/// token is matched again with surrounding whitespace trimmed. The text
/// branch returns `raw` unchanged.
///
/// The prefix is matched case-insensitively. A trailing suffix, when the
/// template has one and the token carries it, is removed before the numeric
/// check.
#[must_use]
pub fn resolve_search_token(raw: &str, template: &IdentifierTemplate) -> SearchToken {
    let exact =
        match_template(raw, template).or_else(|| match_template(raw.trim(), template));

    match exact {
        Some(value) => SearchToken::Exact(value),
        None => SearchToken::Text(raw.to_string()),
    }
}

fn match_template(token: &str, template: &IdentifierTemplate) -> Option<i64> {
    let rest = strip_prefix_ignore_case(token, template.prefix())?;
    let remainder = if template.suffix().is_empty() {
        rest
    } else {
        strip_suffix_ignore_case(rest, template.suffix()).unwrap_or(rest)
    };
    parse_sequence_digits(remainder)
}

/// Resolves a token when no template is configured for the entity type.
///
/// A bare integer is an exact match; anything else is free text.
#[must_use]
pub fn resolve_raw(raw: &str) -> SearchToken {
    match parse_sequence_digits(raw.trim()) {
        Some(value) => SearchToken::Exact(value),
        None => SearchToken::Text(raw.to_string()),
    }
}

/// One or more ASCII digits that fit in an i64. Signs are rejected.
fn parse_sequence_digits(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

// Both helpers walk the lowercase expansion of the affix, consuming whole
// characters of `s`. A character whose lowercase form spans the end of the
// affix does not match.
fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let mut expected = prefix.chars().flat_map(char::to_lowercase).peekable();
    let mut chars = s.chars();
    while expected.peek().is_some() {
        let c = chars.next()?;
        for lower in c.to_lowercase() {
            if expected.next() != Some(lower) {
                return None;
            }
        }
    }
    Some(chars.as_str())
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let mut expected = suffix
        .chars()
        .rev()
        .flat_map(|c| c.to_lowercase().rev())
        .peekable();
    let mut chars = s.chars();
    while expected.peek().is_some() {
        let c = chars.next_back()?;
        for lower in c.to_lowercase().rev() {
            if expected.next() != Some(lower) {
                return None;
            }
        }
    }
    Some(chars.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn req() -> IdentifierTemplate {
        IdentifierTemplate::parse("REQ-{0000}")
    }

    fn text(s: &str) -> SearchToken {
        SearchToken::Text(s.to_string())
    }

    #[rstest]
    #[case("REQ-42", SearchToken::Exact(42))]
    #[case("req-42", SearchToken::Exact(42))]
    #[case("Req-0042", SearchToken::Exact(42))]
    #[case("  REQ-7 ", SearchToken::Exact(7))]
    #[case("Login bug", text("Login bug"))]
    #[case("REQ-abc", text("REQ-abc"))]
    #[case("REQ-", text("REQ-"))]
    #[case("REQ-+5", text("REQ-+5"))]
    #[case("REQ--5", text("REQ--5"))]
    #[case("REQ-4 2", text("REQ-4 2"))]
    #[case("REQ-99999999999999999999", text("REQ-99999999999999999999"))]
    #[case("RE", text("RE"))]
    #[case("42", text("42"))]
    fn test_resolve_req_template(#[case] raw: &str, #[case] expected: SearchToken) {
        assert_eq!(resolve_search_token(raw, &req()), expected);
    }

    #[test]
    fn test_case_insensitive_prefix_matches_uppercase() {
        let template = req();
        assert_eq!(
            resolve_search_token("req-42", &template),
            resolve_search_token("REQ-42", &template)
        );
    }

    #[test]
    fn test_text_branch_keeps_raw_token() {
        assert_eq!(resolve_search_token("  hello ", &req()), text("  hello "));
    }

    #[test]
    fn test_empty_prefix_template() {
        let template = IdentifierTemplate::parse("{n}");
        assert_eq!(resolve_search_token("15", &template), SearchToken::Exact(15));
        assert_eq!(resolve_search_token("abc", &template), text("abc"));
    }

    #[test]
    fn test_suffix_is_stripped() {
        let template = IdentifierTemplate::parse("TC-{n}-A");
        assert_eq!(resolve_search_token("tc-12-a", &template), SearchToken::Exact(12));
        assert_eq!(resolve_search_token("TC-12", &template), SearchToken::Exact(12));
        assert_eq!(resolve_search_token("TC-12-B", &template), text("TC-12-B"));
    }

    #[test]
    fn test_template_without_placeholder() {
        let template = IdentifierTemplate::parse("BUG#");
        assert_eq!(resolve_search_token("bug#3", &template), SearchToken::Exact(3));
    }

    #[test]
    fn test_unicode_prefix_case_folding() {
        let template = IdentifierTemplate::parse("ÉTUDE-{n}");
        assert_eq!(resolve_search_token("étude-5", &template), SearchToken::Exact(5));
    }

    #[test]
    fn test_dotted_capital_i_prefix() {
        let template = IdentifierTemplate::parse("İD-{n}");
        assert_eq!(resolve_search_token("İD-5", &template), SearchToken::Exact(5));
        assert_eq!(resolve_search_token("i\u{307}d-5", &template), SearchToken::Exact(5));
        assert_eq!(resolve_search_token("ID-5", &template), text("ID-5"));
    }

    #[test]
    fn test_whitespace_in_template_affixes() {
        let leading = IdentifierTemplate::parse(" REQ-{n}");
        assert_eq!(resolve_search_token(&leading.format(5), &leading), SearchToken::Exact(5));

        let trailing = IdentifierTemplate::parse("{n} X ");
        assert_eq!(resolve_search_token(&trailing.format(5), &trailing), SearchToken::Exact(5));
        assert_eq!(resolve_search_token("5 x ", &trailing), SearchToken::Exact(5));
    }

    #[test]
    fn test_resolve_raw() {
        assert_eq!(resolve_raw(" 42 "), SearchToken::Exact(42));
        assert_eq!(resolve_raw("REQ-42"), text("REQ-42"));
    }

    #[test]
    fn test_search_token_json_shape() {
        let exact = serde_json::to_value(SearchToken::Exact(42)).unwrap();
        assert_eq!(exact, serde_json::json!({"kind": "exact", "value": 42}));
        let free = serde_json::to_value(text("Login bug")).unwrap();
        assert_eq!(free, serde_json::json!({"kind": "text", "value": "Login bug"}));
    }

    #[test]
    fn test_exact_value_accessor() {
        assert_eq!(SearchToken::Exact(3).exact_value(), Some(3));
        assert!(!text("x").is_exact());
    }

    proptest! {
        #[test]
        fn format_then_resolve_recovers_value(
            prefix in "[A-Za-z _#Éİ-]{0,8}",
            marker in "[0-9a-z]{1,6}",
            suffix in "[A-Za-z _#Éİ-]{0,4}",
            value in 0i64..=i64::MAX,
        ) {
            let template = IdentifierTemplate::parse(&format!("{prefix}{{{marker}}}{suffix}"));
            let formatted = template.format(value);
            prop_assert_eq!(resolve_search_token(&formatted, &template), SearchToken::Exact(value));
            prop_assert_eq!(
                resolve_search_token(&formatted.to_lowercase(), &template),
                SearchToken::Exact(value)
            );
        }
    }
}
