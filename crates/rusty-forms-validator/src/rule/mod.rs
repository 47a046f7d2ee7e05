// File: src/rule/mod.rs
// Purpose: Rule contract shared by every server/client validation constraint

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::backend::Backend;
use crate::error::Result;
use crate::form::{Form, FormField};
use crate::value::{FieldValue, SubmittedData};

pub mod tokens;

pub use tokens::replace_tokens;

/// Format value that renders as the literal string `"true"`
pub const BOOLEAN_FORMAT: &str = "boolean";

/// Fallback message for rules without a more specific one
pub const DEFAULT_MESSAGE: &str = "This value seems to be invalid.";

/// How a rule's wire attribute name is determined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawAttribute", into = "RawAttribute")]
pub enum AttributeSpec {
    /// Fixed attribute name
    Literal(String),
    /// Name read from a rule property (`$type` in configuration)
    Dynamic(String),
    /// First name whose `property=value` condition holds
    Conditional(Vec<AttributeCondition>),
}

/// `{ name = "lt", when = "type=lt" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeCondition {
    pub name: String,
    pub when: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawAttribute {
    Name(String),
    Conditions(Vec<AttributeCondition>),
}

impl From<RawAttribute> for AttributeSpec {
    fn from(raw: RawAttribute) -> Self {
        match raw {
            RawAttribute::Name(name) => AttributeSpec::parse(&name),
            RawAttribute::Conditions(conditions) => AttributeSpec::Conditional(conditions),
        }
    }
}

impl From<AttributeSpec> for RawAttribute {
    fn from(spec: AttributeSpec) -> Self {
        match spec {
            AttributeSpec::Literal(name) => RawAttribute::Name(name),
            AttributeSpec::Dynamic(property) => RawAttribute::Name(format!("${}", property)),
            AttributeSpec::Conditional(conditions) => RawAttribute::Conditions(conditions),
        }
    }
}

impl AttributeSpec {
    /// `"$type"` is a dynamic reference, anything else a literal name
    pub fn parse(spec: &str) -> Self {
        match spec.strip_prefix('$') {
            Some(property) => AttributeSpec::Dynamic(property.to_string()),
            None => AttributeSpec::Literal(spec.to_string()),
        }
    }

    pub fn conditional<I, N, W>(conditions: I) -> Self
    where
        I: IntoIterator<Item = (N, W)>,
        N: Into<String>,
        W: Into<String>,
    {
        AttributeSpec::Conditional(
            conditions
                .into_iter()
                .map(|(name, when)| AttributeCondition {
                    name: name.into(),
                    when: when.into(),
                })
                .collect(),
        )
    }

    /// Resolve against a property lookup. `None` means "use the fallback".
    pub fn resolve<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            AttributeSpec::Conditional(conditions) => conditions.iter().find_map(|c| {
                let (property, expected) = c.when.split_once('=')?;
                (lookup(property.trim()).unwrap_or_default() == expected.trim())
                    .then(|| c.name.clone())
            }),
            AttributeSpec::Dynamic(property) => Some(lookup(property).unwrap_or_default()),
            AttributeSpec::Literal(name) if name.is_empty() => None,
            AttributeSpec::Literal(name) => Some(name.clone()),
        }
    }
}

impl From<&str> for AttributeSpec {
    fn from(spec: &str) -> Self {
        AttributeSpec::parse(spec)
    }
}

/// Overridable rule settings, as found under `[rules.<kind>]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleOverride {
    #[serde(default, rename = "type")]
    pub rule_type: Option<String>,

    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub attribute: Option<AttributeSpec>,
}

/// Shared metadata carried by every rule.
///
/// Values resolve as: instance value, then backend override, then the
/// variant default.
#[derive(Debug, Clone, Default)]
pub struct RuleMeta {
    rule_type: Option<String>,
    format: Option<String>,
    attribute: Option<AttributeSpec>,
    message: Option<String>,
    configured: RuleOverride,
}

impl RuleMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule_type(&self) -> Option<&str> {
        non_empty(self.rule_type.as_deref())
            .or_else(|| non_empty(self.configured.rule_type.as_deref()))
    }

    pub fn format(&self) -> Option<&str> {
        non_empty(self.format.as_deref()).or_else(|| non_empty(self.configured.format.as_deref()))
    }

    pub fn attribute(&self) -> Option<&AttributeSpec> {
        self.attribute.as_ref().or(self.configured.attribute.as_ref())
    }

    pub fn message(&self) -> Option<&str> {
        non_empty(self.message.as_deref())
    }

    pub fn set_type(&mut self, rule_type: impl Into<String>) {
        self.rule_type = Some(rule_type.into());
    }

    pub fn set_format(&mut self, format: impl Into<String>) {
        self.format = Some(format.into());
    }

    pub fn set_attribute(&mut self, attribute: impl Into<AttributeSpec>) {
        self.attribute = Some(attribute.into());
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Install backend configuration for this rule's kind
    pub fn configure(&mut self, overrides: RuleOverride) {
        self.configured = overrides;
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Everything a rule may consult besides its own state.
///
/// Rules never own their field, form or backend: they get them here, looked
/// up by name at the moment they are used.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    /// Name of the field the rule is attached to
    pub field: &'a str,
    pub form: Option<&'a dyn Form>,
    pub backend: &'a dyn Backend,
    /// Base for resolving relative remote URLs
    pub base_url: Option<&'a Url>,
    /// Submitted data during a server-side pass
    pub data: Option<&'a SubmittedData>,
}

impl<'a> RuleContext<'a> {
    pub fn new(field: &'a str, backend: &'a dyn Backend) -> Self {
        Self {
            field,
            form: None,
            backend,
            base_url: None,
            data: None,
        }
    }

    pub fn with_form(mut self, form: &'a dyn Form) -> Self {
        self.form = Some(form);
        self
    }

    pub fn with_base_url(mut self, base_url: Option<&'a Url>) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_data(mut self, data: &'a SubmittedData) -> Self {
        self.data = Some(data);
        self
    }

    /// Sibling field lookup on the bound form
    pub fn data_field(&self, name: &str) -> Option<&'a dyn FormField> {
        self.form.and_then(|form| form.field(name))
    }

    /// Value of a form field: the submitted one during a server-side pass,
    /// the field's current one otherwise. `None` if the form lacks the field.
    pub fn field_value(&self, name: &str) -> Option<FieldValue> {
        let field = self.data_field(name)?;
        Some(match self.data {
            Some(data) => data.get(name).cloned().unwrap_or_default(),
            None => field.value(),
        })
    }
}

impl fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleContext")
            .field("field", &self.field)
            .field("form", &self.form.map(|form| form.name()))
            .field("base_url", &self.base_url)
            .field("data", &self.data.map(|data| data.len()))
            .finish()
    }
}

/// A single validation constraint, testable server-side and renderable as a
/// client-side attribute/value/message triple.
pub trait Rule: fmt::Debug {
    /// Concrete rule kind, the key for configuration overrides and for
    /// one-rule-per-kind replacement on a field
    fn kind(&self) -> &'static str;

    fn meta(&self) -> &RuleMeta;

    fn meta_mut(&mut self) -> &mut RuleMeta;

    /// Logical type used when neither the instance nor configuration sets one
    fn default_type(&self) -> &str;

    fn default_format(&self) -> Option<&str> {
        None
    }

    /// Server-side check of a submitted value
    fn test(&self, value: &FieldValue, ctx: &RuleContext<'_>) -> Result<bool>;

    fn default_message(&self, _ctx: &RuleContext<'_>) -> String {
        DEFAULT_MESSAGE.to_string()
    }

    /// Whether the variant-specific configuration is present
    fn has_required_config(&self) -> bool {
        true
    }

    /// Variant accessor table. `name` is already lower-cased.
    fn property(&self, _name: &str, _ctx: &RuleContext<'_>) -> Option<String> {
        None
    }

    /// Attributes emitted in addition to the main attribute/value pair
    fn extra_attributes(&self, _ctx: &RuleContext<'_>) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Whether this rule makes its field required
    fn is_required(&self) -> bool {
        false
    }

    fn rule_type(&self) -> String {
        self.meta()
            .rule_type()
            .unwrap_or_else(|| self.default_type())
            .to_string()
    }

    fn format(&self) -> Option<String> {
        self.meta()
            .format()
            .or_else(|| self.default_format())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
    }

    /// Token lookup: accessors first, case-insensitively, then variant properties
    fn token(&self, name: &str, ctx: &RuleContext<'_>) -> Option<String> {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "type" => Some(self.rule_type()),
            "format" => self.format(),
            "fieldname" => Some(ctx.field.to_string()),
            _ => self.property(&name, ctx),
        }
    }

    fn replace_tokens(&self, template: &str, ctx: &RuleContext<'_>) -> String {
        tokens::replace_tokens(template, |name| self.token(name, ctx))
    }

    /// Wire attribute name (unprefixed)
    fn attribute(&self, ctx: &RuleContext<'_>) -> String {
        let lookup = |property: &str| self.token(property, ctx);
        self.meta()
            .attribute()
            .and_then(|spec| spec.resolve(lookup))
            .or_else(|| {
                ctx.backend
                    .default_attribute()
                    .and_then(|spec| spec.resolve(lookup))
            })
            .unwrap_or_default()
    }

    /// Wire attribute value
    fn value(&self, ctx: &RuleContext<'_>) -> String {
        match self.format() {
            Some(format) if format == BOOLEAN_FORMAT => "true".to_string(),
            Some(format) => self.replace_tokens(&format, ctx),
            None => self.rule_type(),
        }
    }

    fn message(&self, ctx: &RuleContext<'_>) -> String {
        match self.meta().message() {
            Some(message) => message.to_string(),
            None => self.default_message(ctx),
        }
    }

    fn has_message(&self, ctx: &RuleContext<'_>) -> bool {
        !self.message(ctx).is_empty()
    }

    /// Whether the rule can be rendered client-side and enforced server-side
    fn is_valid(&self, ctx: &RuleContext<'_>) -> bool {
        !self.attribute(ctx).is_empty() && self.has_required_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ParsleyBackend;
    use crate::rules::{ComparisonRule, RangeRule, RequiredRule};

    #[test]
    fn test_attribute_spec_parse() {
        assert_eq!(AttributeSpec::parse("$type"), AttributeSpec::Dynamic("type".into()));
        assert_eq!(AttributeSpec::parse("type"), AttributeSpec::Literal("type".into()));
    }

    #[test]
    fn test_conditional_attribute() {
        let spec = AttributeSpec::conditional([("less", "type=lt"), ("greater", "type=gt")]);
        let lookup = |p: &str| (p == "type").then(|| "gt".to_string());
        assert_eq!(spec.resolve(lookup), Some("greater".to_string()));

        let nothing = |_: &str| None::<String>;
        assert_eq!(spec.resolve(nothing), None);
    }

    #[test]
    fn test_attribute_falls_back_to_backend_default() {
        let backend = ParsleyBackend::default();
        let ctx = RuleContext::new("age", &backend);
        let rule = RangeRule::new(1.0, 10.0);

        // Parsley's default attribute is `$type`
        assert_eq!(rule.attribute(&ctx), "range");
        assert_eq!(rule.value(&ctx), "[1, 10]");
    }

    #[test]
    fn test_explicit_settings_win() {
        let backend = ParsleyBackend::default();
        let ctx = RuleContext::new("age", &backend);
        let mut rule = RangeRule::new(1.0, 10.0);
        rule.meta_mut().set_attribute("between");
        rule.meta_mut().set_format("{min}..{max}");
        rule.meta_mut().set_message("Out of range");

        assert_eq!(rule.attribute(&ctx), "between");
        assert_eq!(rule.value(&ctx), "1..10");
        assert_eq!(rule.message(&ctx), "Out of range");
    }

    #[test]
    fn test_boolean_format_and_type_value() {
        let backend = ParsleyBackend::default();
        let ctx = RuleContext::new("name", &backend);
        let mut rule = RequiredRule::new();
        assert_eq!(rule.value(&ctx), "required");

        rule.meta_mut().set_format(BOOLEAN_FORMAT);
        assert_eq!(rule.value(&ctx), "true");
    }

    #[test]
    fn test_dynamic_attribute_reads_type() {
        let backend = ParsleyBackend::default();
        let ctx = RuleContext::new("end", &backend);
        let mut rule = ComparisonRule::new("gte", "start").unwrap();
        rule.meta_mut().set_attribute("$type");
        assert_eq!(rule.attribute(&ctx), "gte");
    }

    #[test]
    fn test_override_sits_between_default_and_instance() {
        let backend = ParsleyBackend::default();
        let ctx = RuleContext::new("name", &backend);
        let mut rule = RequiredRule::new();
        rule.meta_mut().configure(RuleOverride {
            rule_type: Some("mandatory".into()),
            ..RuleOverride::default()
        });
        assert_eq!(rule.rule_type(), "mandatory");

        rule.meta_mut().set_type("needed");
        assert_eq!(rule.rule_type(), "needed");
    }
}
