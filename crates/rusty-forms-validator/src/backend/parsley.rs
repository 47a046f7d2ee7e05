// File: src/backend/parsley.rs
// Purpose: Parsley.js backend

use crate::attributes::AttributeSet;
use crate::config::ValidatorConfig;
use crate::form::{Form, FormField};
use crate::rule::{Rule, RuleContext, RuleOverride};

use super::{AttributeNames, Backend};

/// Emits `data-parsley-*` attributes
#[derive(Debug, Clone)]
pub struct ParsleyBackend {
    config: ValidatorConfig,
    names: AttributeNames,
    trigger_on: Option<String>,
}

impl Default for ParsleyBackend {
    fn default() -> Self {
        Self::new(&ValidatorConfig::default())
    }
}

impl ParsleyBackend {
    pub fn new(config: &ValidatorConfig) -> Self {
        Self {
            names: AttributeNames::from_config(&config.backend),
            config: config.clone(),
            trigger_on: None,
        }
    }

    /// Events that trigger validation, one (`"change"`) or many
    /// (`["focusout", "keyup"]`)
    pub fn set_trigger_on<I, S>(&mut self, events: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let events = events
            .into_iter()
            .map(|e| e.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        self.trigger_on = Some(events).filter(|e| !e.is_empty());
        self
    }

    /// Configured trigger events, or the default
    pub fn trigger_on(&self) -> &str {
        self.trigger_on
            .as_deref()
            .unwrap_or(&self.config.backend.parsley.trigger_on)
    }
}

impl Backend for ParsleyBackend {
    fn names(&self) -> &AttributeNames {
        &self.names
    }

    fn rule_override(&self, kind: &str) -> RuleOverride {
        self.config.rule_override(kind)
    }

    fn html_class(&self) -> &str {
        "parsleybackend"
    }

    fn configured_js(&self) -> &[String] {
        &self.config.backend.required_js
    }

    fn configured_css(&self) -> &[String] {
        &self.config.backend.required_css
    }

    fn attributes_for_form(&self, _form: &dyn Form, client_side: bool) -> AttributeSet {
        let parsley = &self.config.backend.parsley;
        let mut attributes = AttributeSet::new();

        attributes.set("data-client-side", if client_side { "true" } else { "false" });
        attributes.set("data-group-class", parsley.group_class.as_str());
        attributes.set("data-error-wrapper-class", parsley.error_wrapper_class.as_str());
        attributes.set("data-group-error-class", parsley.group_error_class.as_str());
        attributes.set("data-field-error-class", parsley.field_error_class.as_str());
        attributes.set("data-group-success-class", parsley.group_success_class.as_str());
        attributes.set("data-field-success-class", parsley.field_success_class.as_str());
        attributes.set("data-parsley-trigger", self.trigger_on());

        attributes
    }

    fn attributes_for_field(
        &self,
        field: &dyn FormField,
        rules: &[Box<dyn Rule>],
        ctx: &RuleContext<'_>,
    ) -> AttributeSet {
        let mut attributes = AttributeSet::new();

        // Checkbox sets and multi-selects validate as one group
        if field.is_multiple() {
            attributes.set(self.prefix("multiple"), field.name());
        }

        for rule in rules {
            if rule.is_valid(ctx) {
                let attribute = rule.attribute(ctx);
                attributes.push(self.prefix(&attribute), rule.value(ctx));

                if rule.has_message(ctx) {
                    attributes.set(self.attr("message", &[&attribute]), rule.message(ctx));
                }
            }

            for (name, value) in rule.extra_attributes(ctx) {
                attributes.push(self.attr(&name, &[]), value);
            }
        }

        attributes
    }
}
