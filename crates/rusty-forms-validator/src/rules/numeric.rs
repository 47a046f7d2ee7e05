// File: src/rules/numeric.rs
// Purpose: Single-bound rules (min, max, mincheck, maxwords)

use crate::error::Result;
use crate::rule::{Rule, RuleContext, RuleMeta};
use crate::rules::word_count;
use crate::value::{format_number, FieldValue};

fn bound_property(bound: Option<f64>) -> Option<String> {
    Some(bound.map(format_number).unwrap_or_default())
}

/// Numeric value must be greater than or equal to `min`
#[derive(Debug, Clone, Default)]
pub struct MinRule {
    meta: RuleMeta,
    min: Option<f64>,
}

impl MinRule {
    pub fn new(min: f64) -> Self {
        Self {
            min: Some(min),
            ..Self::default()
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn set_min(&mut self, min: f64) -> &mut Self {
        self.min = Some(min);
        self
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }
}

impl Rule for MinRule {
    fn kind(&self) -> &'static str {
        "min"
    }

    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn default_type(&self) -> &str {
        "min"
    }

    fn default_format(&self) -> Option<&str> {
        Some("{min}")
    }

    fn has_required_config(&self) -> bool {
        self.min.is_some()
    }

    fn property(&self, name: &str, _ctx: &RuleContext<'_>) -> Option<String> {
        match name {
            "min" => bound_property(self.min),
            _ => None,
        }
    }

    fn test(&self, value: &FieldValue, ctx: &RuleContext<'_>) -> Result<bool> {
        match (self.min, value.as_number()) {
            (Some(min), Some(n)) if self.is_valid(ctx) => Ok(n >= min),
            _ => Ok(true),
        }
    }

    fn default_message(&self, _ctx: &RuleContext<'_>) -> String {
        format!(
            "This value should be greater than or equal to {}.",
            self.min.map(format_number).unwrap_or_default()
        )
    }
}

/// Numeric value must be less than or equal to `max`
#[derive(Debug, Clone, Default)]
pub struct MaxRule {
    meta: RuleMeta,
    max: Option<f64>,
}

impl MaxRule {
    pub fn new(max: f64) -> Self {
        Self {
            max: Some(max),
            ..Self::default()
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn set_max(&mut self, max: f64) -> &mut Self {
        self.max = Some(max);
        self
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }
}

impl Rule for MaxRule {
    fn kind(&self) -> &'static str {
        "max"
    }

    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn default_type(&self) -> &str {
        "max"
    }

    fn default_format(&self) -> Option<&str> {
        Some("{max}")
    }

    fn has_required_config(&self) -> bool {
        self.max.is_some()
    }

    fn property(&self, name: &str, _ctx: &RuleContext<'_>) -> Option<String> {
        match name {
            "max" => bound_property(self.max),
            _ => None,
        }
    }

    fn test(&self, value: &FieldValue, ctx: &RuleContext<'_>) -> Result<bool> {
        match (self.max, value.as_number()) {
            (Some(max), Some(n)) if self.is_valid(ctx) => Ok(n <= max),
            _ => Ok(true),
        }
    }

    fn default_message(&self, _ctx: &RuleContext<'_>) -> String {
        format!(
            "This value should be less than or equal to {}.",
            self.max.map(format_number).unwrap_or_default()
        )
    }
}

/// A multi-value field must have at least `min` selections
#[derive(Debug, Clone, Default)]
pub struct MinCheckRule {
    meta: RuleMeta,
    min: Option<f64>,
}

impl MinCheckRule {
    pub fn new(min: usize) -> Self {
        Self {
            min: Some(min as f64),
            ..Self::default()
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn set_min(&mut self, min: usize) -> &mut Self {
        self.min = Some(min as f64);
        self
    }

    pub fn min(&self) -> Option<usize> {
        self.min.map(|min| min as usize)
    }
}

impl Rule for MinCheckRule {
    fn kind(&self) -> &'static str {
        "min_check"
    }

    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn default_type(&self) -> &str {
        "mincheck"
    }

    fn default_format(&self) -> Option<&str> {
        Some("{min}")
    }

    fn has_required_config(&self) -> bool {
        self.min.is_some()
    }

    fn property(&self, name: &str, _ctx: &RuleContext<'_>) -> Option<String> {
        match name {
            "min" => bound_property(self.min),
            _ => None,
        }
    }

    fn test(&self, value: &FieldValue, ctx: &RuleContext<'_>) -> Result<bool> {
        match self.min {
            Some(min) if self.is_valid(ctx) && !value.is_empty() => {
                Ok(value.count() as f64 >= min)
            }
            _ => Ok(true),
        }
    }

    fn default_message(&self, _ctx: &RuleContext<'_>) -> String {
        format!(
            "You must select a minimum of {} options.",
            self.min.map(format_number).unwrap_or_default()
        )
    }
}

/// Text must contain at most `max` words
#[derive(Debug, Clone, Default)]
pub struct MaxWordsRule {
    meta: RuleMeta,
    max: Option<f64>,
}

impl MaxWordsRule {
    pub fn new(max: usize) -> Self {
        Self {
            max: Some(max as f64),
            ..Self::default()
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn set_max(&mut self, max: usize) -> &mut Self {
        self.max = Some(max as f64);
        self
    }

    pub fn max(&self) -> Option<usize> {
        self.max.map(|max| max as usize)
    }
}

impl Rule for MaxWordsRule {
    fn kind(&self) -> &'static str {
        "max_words"
    }

    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn default_type(&self) -> &str {
        "maxwords"
    }

    fn default_format(&self) -> Option<&str> {
        Some("{max}")
    }

    fn has_required_config(&self) -> bool {
        self.max.is_some()
    }

    fn property(&self, name: &str, _ctx: &RuleContext<'_>) -> Option<String> {
        match name {
            "max" => bound_property(self.max),
            _ => None,
        }
    }

    fn test(&self, value: &FieldValue, ctx: &RuleContext<'_>) -> Result<bool> {
        match self.max {
            Some(max) if self.is_valid(ctx) && !value.is_empty() => {
                Ok(word_count(&value.as_text()) as f64 <= max)
            }
            _ => Ok(true),
        }
    }

    fn default_message(&self, _ctx: &RuleContext<'_>) -> String {
        format!(
            "This value should contain a maximum of {} words.",
            self.max.map(format_number).unwrap_or_default()
        )
    }
}
