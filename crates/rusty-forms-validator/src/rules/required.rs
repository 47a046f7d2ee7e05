// File: src/rules/required.rs
// Purpose: Required field rule

use crate::error::Result;
use crate::rule::{Rule, RuleContext, RuleMeta};
use crate::value::FieldValue;

/// The field must not be submitted empty.
///
/// Unlike the other rules this one is always evaluated: an empty value is
/// exactly what it exists to reject.
#[derive(Debug, Clone, Default)]
pub struct RequiredRule {
    meta: RuleMeta,
}

impl RequiredRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(message: Option<&str>) -> Self {
        let mut rule = Self::new();
        if let Some(message) = message {
            rule.meta.set_message(message);
        }
        rule
    }
}

impl Rule for RequiredRule {
    fn kind(&self) -> &'static str {
        "required"
    }

    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn default_type(&self) -> &str {
        "required"
    }

    fn test(&self, value: &FieldValue, _ctx: &RuleContext<'_>) -> Result<bool> {
        Ok(!value.is_missing())
    }

    fn default_message(&self, _ctx: &RuleContext<'_>) -> String {
        "This value is required.".to_string()
    }

    fn is_required(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ParsleyBackend;

    #[test]
    fn test_required_compares_against_empty_string() {
        let backend = ParsleyBackend::default();
        let ctx = RuleContext::new("name", &backend);
        let rule = RequiredRule::new();

        assert!(!rule.test(&"".into(), &ctx).unwrap());
        assert!(!rule.test(&FieldValue::Null, &ctx).unwrap());
        assert!(rule.test(&" ".into(), &ctx).unwrap());
        assert!(rule.test(&0.into(), &ctx).unwrap());
        assert!(rule.test(&false.into(), &ctx).unwrap());
    }

    #[test]
    fn test_messages() {
        let backend = ParsleyBackend::default();
        let ctx = RuleContext::new("name", &backend);
        assert_eq!(RequiredRule::new().message(&ctx), "This value is required.");
        assert_eq!(
            RequiredRule::with_message(Some("Name please")).message(&ctx),
            "Name please"
        );
    }
}
