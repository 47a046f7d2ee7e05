// File: src/rules/domain.rs
// Purpose: Domain name rule (server side of the client `domain` validator)

use crate::error::Result;
use crate::rule::{Rule, RuleContext, RuleMeta};
use crate::value::FieldValue;

const MAX_LABEL: usize = 63;

/// Check a host name: `localhost`, or dot-separated labels ending in a TLD
/// that does not start with a digit
pub fn is_valid_domain(value: &str) -> bool {
    if value == "localhost" {
        return true;
    }

    let labels: Vec<&str> = value.split('.').collect();
    let Some((tld, hosts)) = labels.split_last() else {
        return false;
    };
    if hosts.is_empty() {
        return false;
    }

    let label_ok = |label: &str| {
        !label.is_empty()
            && label.len() <= MAX_LABEL
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };

    hosts.iter().all(|label| label_ok(label))
        && !tld.is_empty()
        && tld.len() <= MAX_LABEL
        && tld.chars().all(|c| c.is_ascii_alphanumeric())
        && !tld.starts_with(|c: char| c.is_ascii_digit())
}

/// Value must be a domain name
#[derive(Debug, Clone, Default)]
pub struct DomainRule {
    meta: RuleMeta,
}

impl DomainRule {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rule for DomainRule {
    fn kind(&self) -> &'static str {
        "domain"
    }

    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn default_type(&self) -> &str {
        "domain"
    }

    fn test(&self, value: &FieldValue, _ctx: &RuleContext<'_>) -> Result<bool> {
        if value.is_empty() {
            return Ok(true);
        }
        Ok(is_valid_domain(&value.as_text()))
    }

    fn default_message(&self, _ctx: &RuleContext<'_>) -> String {
        "This value should be a valid domain name.".to_string()
    }
}
