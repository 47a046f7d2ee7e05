// File: src/rules/text.rs
// Purpose: Alphanumeric and URL format rules

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::Result;
use crate::rule::{Rule, RuleContext, RuleMeta};
use crate::value::FieldValue;

static ALPHANUM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^[a-z0-9_]+$").unwrap());

// Schemes that are valid URLs without an authority part
const HOSTLESS_SCHEMES: &[&str] = &["mailto", "news", "file", "urn", "data"];

/// Value must consist of word characters only
#[derive(Debug, Clone, Default)]
pub struct AlphaNumRule {
    meta: RuleMeta,
}

impl AlphaNumRule {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rule for AlphaNumRule {
    fn kind(&self) -> &'static str {
        "alpha_num"
    }

    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn default_type(&self) -> &str {
        "alphanum"
    }

    fn test(&self, value: &FieldValue, _ctx: &RuleContext<'_>) -> Result<bool> {
        if value.is_empty() {
            return Ok(true);
        }
        Ok(ALPHANUM_REGEX.is_match(&value.as_text()))
    }

    fn default_message(&self, _ctx: &RuleContext<'_>) -> String {
        "This value should be alphanumeric.".to_string()
    }
}

/// Value must be a syntactically valid absolute URL
#[derive(Debug, Clone, Default)]
pub struct UrlRule {
    meta: RuleMeta,
}

impl UrlRule {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Validate URL format
pub fn is_valid_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => url.has_host() || HOSTLESS_SCHEMES.contains(&url.scheme()),
        Err(_) => false,
    }
}

impl Rule for UrlRule {
    fn kind(&self) -> &'static str {
        "url"
    }

    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn default_type(&self) -> &str {
        "url"
    }

    fn test(&self, value: &FieldValue, _ctx: &RuleContext<'_>) -> Result<bool> {
        if value.is_empty() {
            return Ok(true);
        }
        Ok(is_valid_url(&value.as_text()))
    }

    fn default_message(&self, _ctx: &RuleContext<'_>) -> String {
        "This value should be a valid URL.".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ParsleyBackend;
    use rstest::rstest;

    #[rstest]
    #[case("abc_123", true)]
    #[case("ABC", true)]
    #[case("abc-123", false)]
    #[case("two words", false)]
    #[case("", true)]
    fn test_alphanum(#[case] input: &str, #[case] expected: bool) {
        let backend = ParsleyBackend::default();
        let ctx = RuleContext::new("username", &backend);
        assert_eq!(AlphaNumRule::new().test(&input.into(), &ctx).unwrap(), expected);
    }

    #[rstest]
    #[case("https://example.com/path?q=1", true)]
    #[case("ftp://files.example.org", true)]
    #[case("mailto:someone@example.com", true)]
    #[case("example.com", false)]
    #[case("http://", false)]
    #[case("", true)]
    fn test_url(#[case] input: &str, #[case] expected: bool) {
        let backend = ParsleyBackend::default();
        let ctx = RuleContext::new("website", &backend);
        assert_eq!(UrlRule::new().test(&input.into(), &ctx).unwrap(), expected);
    }
}
