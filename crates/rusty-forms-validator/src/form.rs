// File: src/form.rs
// Purpose: Form and field capabilities consumed by rules, backends and the validator

use std::collections::BTreeMap;
use std::fmt;

use crate::result::ValidationResult;
use crate::value::FieldValue;

/// A single form field as seen by the validation engine.
///
/// Host frameworks implement this for their own field types. The engine only
/// reads through it, except for attribute injection during rendering.
pub trait FormField: fmt::Debug {
    /// Field name (the key used in submitted data)
    fn name(&self) -> &str;

    /// Current value held by the field
    fn value(&self) -> FieldValue;

    /// Human readable title, used in default messages
    fn title(&self) -> String;

    /// HTML id of the rendered element
    fn id(&self) -> String {
        self.attribute("id").unwrap_or_else(|| self.name().to_string())
    }

    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&mut self, name: &str, value: String);

    /// Whether the field submits several values (checkbox sets, multi-selects)
    fn is_multiple(&self) -> bool {
        false
    }

    /// Framework-level validation run before any rule.
    ///
    /// Pushes its own errors into `result` and answers whether the field passed.
    fn validate(&self, _result: &mut ValidationResult) -> bool {
        true
    }
}

/// A form: a named collection of fields plus form-level attributes
pub trait Form: fmt::Debug {
    fn name(&self) -> &str;

    /// Look up a data field by name
    fn field(&self, name: &str) -> Option<&dyn FormField>;

    fn fields(&self) -> Vec<&dyn FormField>;

    fn add_extra_class(&mut self, class: &str);

    fn set_attribute(&mut self, name: &str, value: String);

    /// Framework default for required-ness when no rule says so
    fn field_is_required(&self, _name: &str) -> bool {
        false
    }
}

/// In-memory field, for hosts without their own field model and for tests
#[derive(Debug, Clone, Default)]
pub struct Field {
    name: String,
    title: Option<String>,
    value: FieldValue,
    multiple: bool,
    attributes: BTreeMap<String, String>,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = value.into();
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn set_value(&mut self, value: impl Into<FieldValue>) {
        self.value = value.into();
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

impl FormField for Field {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> FieldValue {
        self.value.clone()
    }

    fn title(&self) -> String {
        self.title.clone().unwrap_or_else(|| title_from_name(&self.name))
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, name: &str, value: String) {
        self.attributes.insert(name.to_string(), value);
    }

    fn is_multiple(&self) -> bool {
        self.multiple
    }
}

/// In-memory form
#[derive(Debug, Clone, Default)]
pub struct BasicForm {
    name: String,
    fields: Vec<Field>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
}

impl BasicForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a field, giving it a `{form}_{field}` id unless it already has one
    pub fn with_field(mut self, field: Field) -> Self {
        self.push_field(field);
        self
    }

    pub fn push_field(&mut self, mut field: Field) {
        if field.attribute("id").is_none() {
            let id = format!("{}_{}", self.name, field.name);
            field.set_attribute("id", id);
        }
        self.fields.push(field);
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

impl Form for BasicForm {
    fn name(&self) -> &str {
        &self.name
    }

    fn field(&self, name: &str) -> Option<&dyn FormField> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f as &dyn FormField)
    }

    fn fields(&self) -> Vec<&dyn FormField> {
        self.fields.iter().map(|f| f as &dyn FormField).collect()
    }

    fn add_extra_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
    }

    fn set_attribute(&mut self, name: &str, value: String) {
        self.attributes.insert(name.to_string(), value);
    }
}

/// "confirm_password" -> "Confirm Password"
fn title_from_name(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_ids_follow_form_name() {
        let form = BasicForm::new("Signup")
            .with_field(Field::new("email"))
            .with_field(Field::new("code").with_title("Code"));

        assert_eq!(form.field("email").map(|f| f.id()), Some("Signup_email".to_string()));
        assert!(form.field("missing").is_none());
        assert_eq!(form.fields().len(), 2);
    }

    #[test]
    fn test_title_falls_back_to_name() {
        let field = Field::new("confirm_password");
        assert_eq!(field.title(), "Confirm Password");
        assert_eq!(Field::new("x").with_title("Ex").title(), "Ex");
    }

    #[test]
    fn test_extra_classes_are_unique() {
        let mut form = BasicForm::new("f");
        form.add_extra_class("parsleybackend");
        form.add_extra_class("parsleybackend");
        assert_eq!(form.classes(), ["parsleybackend".to_string()]);
    }
}
