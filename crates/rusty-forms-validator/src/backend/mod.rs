//! Validator backends: translate rules into a client library's attribute vocabulary

use std::collections::BTreeMap;
use std::fmt;

use crate::attributes::AttributeSet;
use crate::config::BackendConfig;
use crate::form::{Form, FormField};
use crate::rule::{AttributeSpec, Rule, RuleContext, RuleOverride};

pub mod parsley;

pub use parsley::ParsleyBackend;

/// Attribute naming scheme of a backend
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeNames {
    prefix: String,
    default_attribute: Option<AttributeSpec>,
    mappings: BTreeMap<String, String>,
}

impl AttributeNames {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            default_attribute: None,
            mappings: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            default_attribute: config.default_attribute.clone(),
            mappings: config.mappings.clone(),
        }
    }

    pub fn with_default_attribute(mut self, spec: impl Into<AttributeSpec>) -> Self {
        self.default_attribute = Some(spec.into());
        self
    }

    pub fn with_mapping(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.mappings.insert(name.into(), template.into());
        self
    }

    /// Prefix a name, unless it already carries the prefix
    pub fn prefix(&self, name: &str) -> String {
        if self.prefix.is_empty() || name.starts_with(&self.prefix) {
            name.to_string()
        } else {
            format!("{}{}", self.prefix, name)
        }
    }

    pub fn mapping(&self, name: &str) -> Option<&str> {
        self.mappings
            .get(name)
            .map(String::as_str)
            .filter(|m| !m.is_empty())
    }

    /// Attribute name for a mapping (or the name itself), with `%s`
    /// placeholders filled from `args`, prefixed
    pub fn attr(&self, name: &str, args: &[&str]) -> String {
        let template = self.mapping(name).unwrap_or(name);
        if args.is_empty() {
            return self.prefix(template);
        }

        let mut args = args.iter();
        let mut parts = template.split("%s");
        let mut name = parts.next().unwrap_or_default().to_string();
        for part in parts {
            name.push_str(args.next().copied().unwrap_or_default());
            name.push_str(part);
        }
        self.prefix(&name)
    }

    pub fn default_attribute(&self) -> Option<&AttributeSpec> {
        self.default_attribute.as_ref()
    }
}

/// Stylesheets and scripts the host page must load for client validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    pub css: Vec<String>,
    pub js: Vec<String>,
}

/// A client-side validation library, as seen by the validator
pub trait Backend: fmt::Debug {
    fn names(&self) -> &AttributeNames;

    /// Configured overrides for a rule kind
    fn rule_override(&self, kind: &str) -> RuleOverride;

    /// Class added to bound forms
    fn html_class(&self) -> &str;

    /// Configured script list, before `update_required_js`
    fn configured_js(&self) -> &[String];

    /// Configured stylesheet list, before `update_required_css`
    fn configured_css(&self) -> &[String];

    fn classes_for_form(&self, _form: &dyn Form) -> Vec<String> {
        vec![self.html_class().to_string()]
    }

    fn attributes_for_form(&self, _form: &dyn Form, client_side: bool) -> AttributeSet {
        let mut attributes = AttributeSet::new();
        attributes.set("data-client-side", if client_side { "true" } else { "false" });
        attributes
    }

    /// Attributes for one field, given the rules attached to it
    fn attributes_for_field(
        &self,
        _field: &dyn FormField,
        _rules: &[Box<dyn Rule>],
        _ctx: &RuleContext<'_>,
    ) -> AttributeSet {
        AttributeSet::new()
    }

    /// Hook to adjust the script list
    fn update_required_js(&self, _js: &mut Vec<String>) {}

    /// Hook to adjust the stylesheet list
    fn update_required_css(&self, _css: &mut Vec<String>) {}

    fn required_js(&self) -> Vec<String> {
        let mut js = self.configured_js().to_vec();
        self.update_required_js(&mut js);
        js
    }

    fn required_css(&self) -> Vec<String> {
        let mut css = self.configured_css().to_vec();
        self.update_required_css(&mut css);
        css
    }

    /// Initialise the backend, answering what the page must load
    fn init(&self) -> Requirements {
        Requirements {
            css: self.required_css(),
            js: self.required_js(),
        }
    }

    fn attr(&self, name: &str, args: &[&str]) -> String {
        self.names().attr(name, args)
    }

    fn prefix(&self, name: &str) -> String {
        self.names().prefix(name)
    }

    fn mapping(&self, name: &str) -> Option<&str> {
        self.names().mapping(name)
    }

    fn default_attribute(&self) -> Option<&AttributeSpec> {
        self.names().default_attribute()
    }

    /// Install this backend's overrides for the rule's kind
    fn configure_rule(&self, rule: &mut dyn Rule) {
        let overrides = self.rule_override(rule.kind());
        rule.meta_mut().configure(overrides);
    }
}
