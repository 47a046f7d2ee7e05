// File: src/validator.rs
// Purpose: Per-form rule registry and the server-side validation pass

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, warn};
use url::Url;

use crate::attributes::AttributeSet;
use crate::backend::{Backend, ParsleyBackend, Requirements};
use crate::config::ValidatorConfig;
use crate::error::{Result, ValidatorError};
use crate::form::Form;
use crate::result::ValidationResult;
use crate::rule::{Rule, RuleContext};
use crate::rules::RequiredRule;
use crate::value::SubmittedData;

/// Rules attached to one field, at most one per rule kind
#[derive(Debug, Default)]
struct FieldRules {
    field: String,
    rules: Vec<Box<dyn Rule>>,
}

impl FieldRules {
    /// Replace a rule of the same kind in place, or append
    fn set(&mut self, rule: Box<dyn Rule>) {
        match self.rules.iter_mut().find(|r| r.kind() == rule.kind()) {
            Some(existing) => {
                debug!(field = %self.field, kind = rule.kind(), "Replacing rule");
                *existing = rule;
            }
            None => {
                debug!(field = %self.field, kind = rule.kind(), "Attaching rule");
                self.rules.push(rule);
            }
        }
    }

    fn is_required(&self) -> bool {
        self.rules.iter().any(|r| r.is_required())
    }
}

/// Fields for [`Validator::add_required_fields`]: bare names get the
/// default message, pairs carry their own
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredFields {
    Names(Vec<String>),
    WithMessages(Vec<(String, String)>),
}

impl From<Vec<String>> for RequiredFields {
    fn from(names: Vec<String>) -> Self {
        RequiredFields::Names(names)
    }
}

impl From<Vec<&str>> for RequiredFields {
    fn from(names: Vec<&str>) -> Self {
        RequiredFields::Names(names.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RequiredFields {
    fn from(names: [&str; N]) -> Self {
        RequiredFields::Names(names.iter().map(|n| n.to_string()).collect())
    }
}

impl From<Vec<(&str, &str)>> for RequiredFields {
    fn from(fields: Vec<(&str, &str)>) -> Self {
        RequiredFields::WithMessages(
            fields
                .into_iter()
                .map(|(name, message)| (name.to_string(), message.to_string()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for RequiredFields {
    fn from(fields: BTreeMap<String, String>) -> Self {
        RequiredFields::WithMessages(fields.into_iter().collect())
    }
}

/// Validator in its binding phase: rules are attached by field name, before
/// any form exists.
///
/// ```ignore
/// let mut validator = Validator::new(ParsleyBackend::default());
/// validator.add_required_field("email", None);
/// validator.set_rule("age", RangeRule::new(18.0, 65.0));
///
/// let bound = validator.bind(&mut form);
/// let result = bound.validate(&submitted)?;
/// ```
pub struct Validator {
    backend: Box<dyn Backend>,
    fields: Vec<FieldRules>,
    client_side: bool,
    server_side: bool,
    base_url: Option<Url>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("backend", &self.backend)
            .field("fields", &self.fields)
            .field("client_side", &self.client_side)
            .field("server_side", &self.server_side)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Validator {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self::with_backend(Box::new(backend))
    }

    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            fields: Vec::new(),
            client_side: true,
            server_side: true,
            base_url: None,
        }
    }

    /// Parsley-backed validator from configuration
    pub fn from_config(config: &ValidatorConfig) -> Result<Self> {
        let mut validator = Self::new(ParsleyBackend::new(config));
        validator.client_side = config.validator.client_side;
        validator.server_side = config.validator.server_side;

        if let Some(base_url) = &config.validator.base_url {
            let parsed = Url::parse(base_url).map_err(|source| ValidatorError::InvalidUrl {
                url: base_url.clone(),
                source,
            })?;
            validator.base_url = Some(parsed);
        }

        Ok(validator)
    }

    pub fn set_client_side(&mut self, client_side: bool) -> &mut Self {
        self.client_side = client_side;
        self
    }

    pub fn client_side(&self) -> bool {
        self.client_side
    }

    pub fn set_server_side(&mut self, server_side: bool) -> &mut Self {
        self.server_side = server_side;
        self
    }

    pub fn server_side(&self) -> bool {
        self.server_side
    }

    pub fn set_base_url(&mut self, base_url: Url) -> &mut Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Attach a rule. A rule of the same kind already on the field is
    /// replaced, keeping its position.
    pub fn set_rule(&mut self, field: &str, rule: impl Rule + 'static) -> &mut Self {
        self.set_boxed_rule(field, Box::new(rule))
    }

    pub fn set_boxed_rule(&mut self, field: &str, mut rule: Box<dyn Rule>) -> &mut Self {
        self.backend.configure_rule(rule.as_mut());

        let index = match self.fields.iter().position(|f| f.field == field) {
            Some(index) => index,
            None => {
                self.fields.push(FieldRules {
                    field: field.to_string(),
                    rules: Vec::new(),
                });
                self.fields.len() - 1
            }
        };
        self.fields[index].set(rule);
        self
    }

    /// Attach several rules to one field
    pub fn set_rules<I>(&mut self, field: &str, rules: I) -> &mut Self
    where
        I: IntoIterator<Item = Box<dyn Rule>>,
    {
        for rule in rules {
            self.set_boxed_rule(field, rule);
        }
        self
    }

    pub fn add_required_field(&mut self, field: &str, message: Option<&str>) -> &mut Self {
        self.set_rule(field, RequiredRule::with_message(message))
    }

    pub fn add_required_fields(&mut self, fields: impl Into<RequiredFields>) -> &mut Self {
        match fields.into() {
            RequiredFields::Names(names) => {
                for name in names {
                    self.add_required_field(&name, None);
                }
            }
            RequiredFields::WithMessages(fields) => {
                for (name, message) in fields {
                    self.add_required_field(&name, Some(&message));
                }
            }
        }
        self
    }

    pub fn rules_for_field(&self, field: &str) -> &[Box<dyn Rule>] {
        rules_for(&self.fields, field)
    }

    /// Whether any attached rule makes the field required
    pub fn field_is_required(&self, field: &str) -> bool {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map_or(false, FieldRules::is_required)
    }

    /// Associate the form. Initialises the backend and pushes its classes
    /// and attributes onto the form.
    pub fn bind<'f>(self, form: &'f mut dyn Form) -> BoundValidator<'f> {
        debug!(form = form.name(), fields = self.fields.len(), "Binding validator");

        for entry in &self.fields {
            if form.field(&entry.field).is_none() {
                warn!(
                    form = form.name(),
                    field = %entry.field,
                    "Rules attached to a field the form does not contain; they will be skipped"
                );
            }
        }

        let requirements = self.backend.init();

        for class in self.backend.classes_for_form(&*form) {
            form.add_extra_class(&class);
        }

        let attributes = self.backend.attributes_for_form(&*form, self.client_side);
        for (name, value) in attributes.flatten() {
            form.set_attribute(&name, value);
        }

        BoundValidator {
            validator: self,
            form,
            requirements,
        }
    }
}

fn rules_for<'a>(fields: &'a [FieldRules], field: &str) -> &'a [Box<dyn Rule>] {
    fields
        .iter()
        .find(|f| f.field == field)
        .map(|f| f.rules.as_slice())
        .unwrap_or_default()
}

/// Validator bound to its form, ready to render and validate
pub struct BoundValidator<'f> {
    validator: Validator,
    form: &'f dyn Form,
    requirements: Requirements,
}

impl fmt::Debug for BoundValidator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundValidator")
            .field("validator", &self.validator)
            .field("form", &self.form.name())
            .field("requirements", &self.requirements)
            .finish()
    }
}

impl<'f> BoundValidator<'f> {
    pub fn form(&self) -> &'f dyn Form {
        self.form
    }

    pub fn backend(&self) -> &dyn Backend {
        self.validator.backend()
    }

    /// Stylesheets and scripts the backend asked for at bind time
    pub fn requirements(&self) -> &Requirements {
        &self.requirements
    }

    pub fn client_side(&self) -> bool {
        self.validator.client_side
    }

    pub fn server_side(&self) -> bool {
        self.validator.server_side
    }

    pub fn rules_for_field(&self, field: &str) -> &[Box<dyn Rule>] {
        self.validator.rules_for_field(field)
    }

    /// Rules first, then the form's own notion of required
    pub fn field_is_required(&self, field: &str) -> bool {
        self.validator.field_is_required(field) || self.form.field_is_required(field)
    }

    fn context<'a>(&'a self, field: &'a str) -> RuleContext<'a> {
        RuleContext::new(field, self.validator.backend())
            .with_form(self.form)
            .with_base_url(self.validator.base_url.as_ref())
    }

    /// Client attributes for one field; empty when the form lacks it
    pub fn attributes_for_field(&self, field: &str) -> AttributeSet {
        let Some(form_field) = self.form.field(field) else {
            warn!(form = self.form.name(), field, "No such field");
            return AttributeSet::new();
        };

        let ctx = self.context(field);
        self.backend()
            .attributes_for_field(form_field, self.rules_for_field(field), &ctx)
    }

    pub fn attributes_for_form(&self) -> AttributeSet {
        self.backend()
            .attributes_for_form(self.form, self.validator.client_side)
    }

    pub fn classes_for_form(&self) -> Vec<String> {
        self.backend().classes_for_form(self.form)
    }

    /// Rule type -> message, for rules that have one
    pub fn messages_for_field(&self, field: &str) -> BTreeMap<String, String> {
        let ctx = self.context(field);
        self.rules_for_field(field)
            .iter()
            .filter(|rule| rule.has_message(&ctx))
            .map(|rule| (rule.rule_type(), rule.message(&ctx)))
            .collect()
    }

    pub fn rule_count(&self, field: &str) -> usize {
        self.rules_for_field(field).len()
    }

    /// Server-side pass over submitted data.
    ///
    /// Every field's own check runs first, then every rule of every field
    /// present on the form, without stopping at the first failure. Errors
    /// only come from rules that cannot reach a verdict (a remote call
    /// without response, a broken pattern, a missing target field).
    pub fn validate(&self, data: &SubmittedData) -> Result<ValidationResult> {
        let mut result = ValidationResult::success();

        if !self.validator.server_side {
            debug!(form = self.form.name(), "Server-side validation disabled");
            return Ok(result);
        }

        for field in self.form.fields() {
            if !field.validate(&mut result) {
                result.fail();
            }
        }

        for entry in &self.validator.fields {
            if self.form.field(&entry.field).is_none() {
                continue;
            }

            let ctx = self.context(&entry.field).with_data(data);
            let value = data.get(&entry.field).cloned().unwrap_or_default();

            for rule in &entry.rules {
                if !rule.test(&value, &ctx)? {
                    let message = rule.message(&ctx);
                    debug!(field = %entry.field, kind = rule.kind(), %message, "Rule failed");
                    result.validation_error(entry.field.as_str(), message);
                }
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{BasicForm, Field};
    use crate::rules::{EqualToRule, LengthRule, RangeRule};
    use crate::value::FieldValue;
    use pretty_assertions::assert_eq;

    fn signup_form() -> BasicForm {
        BasicForm::new("Signup")
            .with_field(Field::new("email"))
            .with_field(Field::new("age"))
            .with_field(Field::new("password"))
            .with_field(Field::new("confirm"))
    }

    fn data(pairs: &[(&str, FieldValue)]) -> SubmittedData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_same_kind_replaces_in_place() {
        let mut validator = Validator::new(ParsleyBackend::default());
        validator.add_required_field("email", Some("first"));
        validator.set_rule("email", LengthRule::new(3.0, 50.0));
        validator.add_required_field("email", Some("second"));

        let rules = validator.rules_for_field("email");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].kind(), "required");
        assert_eq!(rules[1].kind(), "length");

        let backend = ParsleyBackend::default();
        let ctx = RuleContext::new("email", &backend);
        assert_eq!(rules[0].message(&ctx), "second");
    }

    #[test]
    fn test_required_fields_forms() {
        let mut validator = Validator::new(ParsleyBackend::default());
        validator.add_required_fields(["email", "age"]);
        validator.add_required_fields(vec![("password", "Choose a password")]);

        assert!(validator.field_is_required("email"));
        assert!(validator.field_is_required("password"));
        assert!(!validator.field_is_required("confirm"));
    }

    #[test]
    fn test_rules_are_configured_on_attach() {
        let mut validator = Validator::new(ParsleyBackend::default());
        validator.add_required_field("email", None);

        let backend = ParsleyBackend::default();
        let ctx = RuleContext::new("email", &backend);
        assert_eq!(validator.rules_for_field("email")[0].value(&ctx), "true");
    }

    #[test]
    fn test_bind_decorates_form() {
        let mut validator = Validator::new(ParsleyBackend::default());
        validator.set_client_side(false);
        let mut form = signup_form();
        {
            let bound = validator.bind(&mut form);
            assert_eq!(bound.requirements().js.len(), 1);
        }

        assert_eq!(form.classes(), ["parsleybackend".to_string()]);
        assert_eq!(form.attributes()["data-client-side"], "false");
        assert_eq!(form.attributes()["data-parsley-trigger"], "change");
    }

    #[test]
    fn test_full_pass_reports_every_failure() {
        let mut validator = Validator::new(ParsleyBackend::default());
        validator.add_required_field("email", None);
        validator.set_rule("age", RangeRule::new(18.0, 65.0));
        let mut form = signup_form();
        let bound = validator.bind(&mut form);

        let result = bound
            .validate(&data(&[("email", "".into()), ("age", 15.into())]))
            .unwrap();

        assert!(!result.is_valid());
        assert_eq!(result.errors().len(), 2);
        assert_eq!(result.first_error("email"), Some("This value is required."));
        assert_eq!(
            result.first_error("age"),
            Some("This value should be between 18 and 65.")
        );
    }

    #[test]
    fn test_server_side_disabled_always_passes() {
        let mut validator = Validator::new(ParsleyBackend::default());
        validator.add_required_field("email", None).set_server_side(false);
        let mut form = signup_form();
        let bound = validator.bind(&mut form);

        assert!(bound.validate(&SubmittedData::new()).unwrap().is_valid());
    }

    #[test]
    fn test_rules_for_missing_fields_are_skipped() {
        let mut validator = Validator::new(ParsleyBackend::default());
        validator.add_required_field("nickname", None);
        let mut form = signup_form();
        let bound = validator.bind(&mut form);

        assert!(bound.validate(&SubmittedData::new()).unwrap().is_valid());
        assert!(bound.attributes_for_field("nickname").is_empty());
    }

    #[test]
    fn test_target_rules_read_submitted_data() {
        let mut validator = Validator::new(ParsleyBackend::default());
        validator.set_rule("confirm", EqualToRule::new("password"));
        let mut form = signup_form();
        let bound = validator.bind(&mut form);

        let matching = data(&[("password", "hunter2".into()), ("confirm", "hunter2".into())]);
        assert!(bound.validate(&matching).unwrap().is_valid());

        let different = data(&[("password", "hunter2".into()), ("confirm", "hunter3".into())]);
        let result = bound.validate(&different).unwrap();
        assert_eq!(
            result.errors_for("confirm"),
            vec!["This value should be the same as the Password field."]
        );
    }

    #[test]
    fn test_messages_and_counts() {
        let mut validator = Validator::new(ParsleyBackend::default());
        validator.add_required_field("email", Some("Email please"));
        validator.set_rule("email", LengthRule::new(3.0, 50.0));
        let mut form = signup_form();
        let bound = validator.bind(&mut form);

        let messages = bound.messages_for_field("email");
        assert_eq!(messages["required"], "Email please");
        assert!(messages.contains_key("length"));
        assert_eq!(bound.rule_count("email"), 2);
        assert_eq!(bound.rule_count("age"), 0);
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = ValidatorConfig::default();
        config.validator.base_url = Some("not a url".to_string());
        assert!(matches!(
            Validator::from_config(&config),
            Err(ValidatorError::InvalidUrl { .. })
        ));
    }
}
