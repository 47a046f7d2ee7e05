// File: src/attributes.rs
// Purpose: Attribute sets produced by backends for forms and fields

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
enum AttributeValue {
    Single(String),
    /// Multi-valued attribute, flattened to space separated tokens
    Multi(Vec<String>),
}

/// Attribute name -> value mapping handed to the client validation library
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSet {
    entries: BTreeMap<String, AttributeValue>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single-valued attribute, replacing anything already there
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries
            .insert(name.into(), AttributeValue::Single(value.into()));
    }

    /// Append a value to a multi-valued attribute
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        let entry = self
            .entries
            .entry(name.into())
            .or_insert_with(|| AttributeValue::Multi(Vec::new()));

        match entry {
            AttributeValue::Multi(values) => values.push(value),
            AttributeValue::Single(existing) => {
                let existing = std::mem::take(existing);
                *entry = AttributeValue::Multi(vec![existing, value]);
            }
        }
    }

    /// Flattened value of one attribute
    pub fn get(&self, name: &str) -> Option<String> {
        self.entries.get(name).map(flatten_value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collapse multi-valued attributes into space separated strings
    pub fn flatten(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(name, value)| (name.clone(), flatten_value(value)))
            .collect()
    }
}

fn flatten_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Single(value) => value.clone(),
        AttributeValue::Multi(values) => values
            .iter()
            .filter(|v| !v.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" "),
    }
}
