// File: src/rules/pattern.rs
// Purpose: Regular expression rule

use once_cell::sync::OnceCell;
use fancy_regex::Regex;

use crate::error::{Result, ValidatorError};
use crate::rule::{Rule, RuleContext, RuleMeta};
use crate::value::FieldValue;

/// Value must match a regular expression.
///
/// Accepts delimited patterns (`/^[a-z]+$/i`, the form Parsley also reads)
/// or bare patterns, which must match the whole value. Lookaround and
/// backreferences are supported.
#[derive(Debug, Default)]
pub struct PatternRule {
    meta: RuleMeta,
    pattern: String,
    compiled: OnceCell<Regex>,
}

impl PatternRule {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    pub fn set_pattern(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.pattern = pattern.into();
        self.compiled = OnceCell::new();
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn regex(&self) -> Result<&Regex> {
        self.compiled.get_or_try_init(|| {
            Regex::new(&translate_pattern(&self.pattern)).map_err(|source| {
                ValidatorError::InvalidPattern {
                    pattern: self.pattern.clone(),
                    source,
                }
            })
        })
    }
}

/// Turn `/body/flags` or a bare pattern into inline-flag syntax
fn translate_pattern(pattern: &str) -> String {
    if let Some(rest) = pattern.strip_prefix('/') {
        if let Some(end) = rest.rfind('/') {
            let (body, flags) = (&rest[..end], &rest[end + 1..]);
            let flags: String = flags
                .chars()
                .filter(|c| matches!(c, 'i' | 'm' | 's' | 'x' | 'U'))
                .collect();
            return if flags.is_empty() {
                body.to_string()
            } else {
                format!("(?{}){}", flags, body)
            };
        }
    }
    format!("^(?:{})$", pattern)
}

impl Rule for PatternRule {
    fn kind(&self) -> &'static str {
        "pattern"
    }

    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn default_type(&self) -> &str {
        "pattern"
    }

    fn default_format(&self) -> Option<&str> {
        Some("{pattern}")
    }

    fn has_required_config(&self) -> bool {
        !self.pattern.is_empty()
    }

    fn property(&self, name: &str, _ctx: &RuleContext<'_>) -> Option<String> {
        match name {
            "pattern" => Some(self.pattern.clone()),
            _ => None,
        }
    }

    fn test(&self, value: &FieldValue, ctx: &RuleContext<'_>) -> Result<bool> {
        if !self.is_valid(ctx) || value.is_empty() {
            return Ok(true);
        }
        self.regex()?
            .is_match(&value.as_text())
            .map_err(|source| ValidatorError::PatternMatch {
                pattern: self.pattern.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ParsleyBackend;

    #[test]
    fn test_delimited_pattern_with_flags() {
        let backend = ParsleyBackend::default();
        let ctx = RuleContext::new("code", &backend);
        let rule = PatternRule::new("/^[a-z]{3}$/i");

        assert!(rule.test(&"AbC".into(), &ctx).unwrap());
        assert!(!rule.test(&"abcd".into(), &ctx).unwrap());
        assert!(rule.test(&"".into(), &ctx).unwrap());
        assert_eq!(rule.value(&ctx), "/^[a-z]{3}$/i");
    }

    #[test]
    fn test_bare_pattern_is_anchored() {
        let backend = ParsleyBackend::default();
        let ctx = RuleContext::new("zip", &backend);
        let rule = PatternRule::new(r"\d{4}");

        assert!(rule.test(&"2000".into(), &ctx).unwrap());
        assert!(!rule.test(&"20001".into(), &ctx).unwrap());
    }

    #[test]
    fn test_empty_pattern_is_invalid() {
        let backend = ParsleyBackend::default();
        let ctx = RuleContext::new("zip", &backend);
        let rule = PatternRule::new("");
        assert!(!rule.is_valid(&ctx));
        assert!(rule.test(&"anything".into(), &ctx).unwrap());
    }

    #[test]
    fn test_broken_pattern_is_a_configuration_error() {
        let backend = ParsleyBackend::default();
        let ctx = RuleContext::new("zip", &backend);
        let rule = PatternRule::new("/([a-z/");
        assert!(matches!(
            rule.test(&"abc".into(), &ctx),
            Err(ValidatorError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_lookahead_and_backreference() {
        let backend = ParsleyBackend::default();
        let ctx = RuleContext::new("password", &backend);
        let rule = PatternRule::new(r"/^(?=.*\d).{8,}$/");

        assert!(rule.test(&"abcdefgh1".into(), &ctx).unwrap());
        assert!(!rule.test(&"abcdefghi".into(), &ctx).unwrap());
        assert!(!rule.test(&"abc1".into(), &ctx).unwrap());

        let doubled = PatternRule::new(r"(\w)\1");
        assert!(doubled.test(&"aa".into(), &ctx).unwrap());
        assert!(!doubled.test(&"ab".into(), &ctx).unwrap());
    }
}
