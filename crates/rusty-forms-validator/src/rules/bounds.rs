// File: src/rules/bounds.rs
// Purpose: Two-sided range rules sharing one inclusive bounds check

use crate::error::Result;
use crate::rule::{Rule, RuleContext, RuleMeta};
use crate::rules::word_count;
use crate::value::{format_number, FieldValue};

/// Inclusive `[min, max]` bounds; both must be set for the owning rule to be valid
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn is_set(&self) -> bool {
        self.min.is_some() && self.max.is_some()
    }

    /// Inclusive containment; unset bounds contain everything
    pub fn contains(&self, n: f64) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => n >= min && n <= max,
            _ => true,
        }
    }

    /// `{min}` / `{max}` token values
    pub fn property(&self, name: &str) -> Option<String> {
        match name {
            "min" => Some(self.min.map(format_number).unwrap_or_default()),
            "max" => Some(self.max.map(format_number).unwrap_or_default()),
            _ => None,
        }
    }

    fn describe(&self) -> (String, String) {
        (
            self.min.map(format_number).unwrap_or_default(),
            self.max.map(format_number).unwrap_or_default(),
        )
    }
}

macro_rules! bounded_rule {
    ($name:ident, $kind:literal, $type:literal) => {
        impl $name {
            pub fn new(min: f64, max: f64) -> Self {
                Self {
                    meta: RuleMeta::new(),
                    bounds: Bounds::new(min, max),
                }
            }

            pub fn unbounded() -> Self {
                Self::default()
            }

            pub fn set_min(&mut self, min: f64) -> &mut Self {
                self.bounds.min = Some(min);
                self
            }

            pub fn set_max(&mut self, max: f64) -> &mut Self {
                self.bounds.max = Some(max);
                self
            }

            pub fn set_range(&mut self, min: f64, max: f64) -> &mut Self {
                self.bounds = Bounds::new(min, max);
                self
            }

            pub fn bounds(&self) -> Bounds {
                self.bounds
            }
        }

        impl Rule for $name {
            fn kind(&self) -> &'static str {
                $kind
            }

            fn meta(&self) -> &RuleMeta {
                &self.meta
            }

            fn meta_mut(&mut self) -> &mut RuleMeta {
                &mut self.meta
            }

            fn default_type(&self) -> &str {
                $type
            }

            fn default_format(&self) -> Option<&str> {
                Some("[{min}, {max}]")
            }

            fn has_required_config(&self) -> bool {
                self.bounds.is_set()
            }

            fn property(&self, name: &str, _ctx: &RuleContext<'_>) -> Option<String> {
                self.bounds.property(name)
            }

            fn test(&self, value: &FieldValue, ctx: &RuleContext<'_>) -> Result<bool> {
                if !self.is_valid(ctx) {
                    return Ok(true);
                }
                Ok(self.check(value))
            }

            fn default_message(&self, _ctx: &RuleContext<'_>) -> String {
                let (min, max) = self.bounds.describe();
                self.describe(&min, &max)
            }
        }
    };
}

/// Numeric value within `[min, max]`
#[derive(Debug, Clone, Default)]
pub struct RangeRule {
    meta: RuleMeta,
    bounds: Bounds,
}

impl RangeRule {
    fn check(&self, value: &FieldValue) -> bool {
        value.as_number().map_or(true, |n| self.bounds.contains(n))
    }

    fn describe(&self, min: &str, max: &str) -> String {
        format!("This value should be between {} and {}.", min, max)
    }
}

bounded_rule!(RangeRule, "range", "range");

/// Character count within `[min, max]`
#[derive(Debug, Clone, Default)]
pub struct LengthRule {
    meta: RuleMeta,
    bounds: Bounds,
}

impl LengthRule {
    fn check(&self, value: &FieldValue) -> bool {
        if value.is_empty() {
            return true;
        }
        self.bounds.contains(value.as_text().chars().count() as f64)
    }

    fn describe(&self, min: &str, max: &str) -> String {
        format!(
            "This value should be between {} and {} characters in length.",
            min, max
        )
    }
}

bounded_rule!(LengthRule, "length", "length");

/// Word count within `[min, max]`
#[derive(Debug, Clone, Default)]
pub struct WordsRule {
    meta: RuleMeta,
    bounds: Bounds,
}

impl WordsRule {
    fn check(&self, value: &FieldValue) -> bool {
        if value.is_empty() {
            return true;
        }
        self.bounds.contains(word_count(&value.as_text()) as f64)
    }

    fn describe(&self, min: &str, max: &str) -> String {
        format!("This value should contain between {} and {} words.", min, max)
    }
}

bounded_rule!(WordsRule, "words", "words");
