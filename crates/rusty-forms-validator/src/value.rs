// File: src/value.rs
// Purpose: Field value types shared by forms, rules and submitted data

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Submitted form data keyed by field name
pub type SubmittedData = BTreeMap<String, FieldValue>;

/// Value held by a form field or submitted for it
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Multi-value fields (checkbox sets, multi-selects)
    List(Vec<String>),
}

impl FieldValue {
    /// Render the value as text (numbers drop a trailing `.0`)
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(true) => "1".to_string(),
            FieldValue::Bool(false) => String::new(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items.join(", "),
        }
    }

    /// Numeric interpretation, if the value is a number or a numeric string
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => parse_numeric(s),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_number().is_some()
    }

    /// Whether the value counts as empty for the "skip when empty" check
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null | FieldValue::Bool(false) => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Whether a required field should reject the value.
    ///
    /// Only the empty string (and its null / empty-list equivalents) is
    /// missing: `0` and `false` are present values.
    pub fn is_missing(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Number of selected elements
    pub fn count(&self) -> usize {
        match self {
            FieldValue::List(items) => items.len(),
            v if v.is_missing() => 0,
            _ => 1,
        }
    }

    /// Loose ordering: numeric when both sides are numeric, textual otherwise
    pub fn loose_cmp(&self, other: &FieldValue) -> Option<Ordering> {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => Some(self.as_text().cmp(&other.as_text())),
        }
    }

    pub fn loose_eq(&self, other: &FieldValue) -> bool {
        self.loose_cmp(other) == Some(Ordering::Equal)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// Format a number nicely (remove .0 for integers)
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn parse_numeric(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty()
        || !s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(items: Vec<&str>) -> Self {
        FieldValue::List(items.into_iter().map(str::to_string).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_text() {
        assert_eq!(FieldValue::from(10).as_text(), "10");
        assert_eq!(FieldValue::from(2.5).as_text(), "2.5");
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(FieldValue::from(" 42 ").as_number(), Some(42.0));
        assert_eq!(FieldValue::from("1e3").as_number(), Some(1000.0));
        assert_eq!(FieldValue::from("-0.5").as_number(), Some(-0.5));
        assert!(!FieldValue::from("x").is_numeric());
        assert!(!FieldValue::from("inf").is_numeric());
        assert!(!FieldValue::from("").is_numeric());
        assert!(!FieldValue::Null.is_numeric());
    }

    #[test]
    fn test_missing_vs_empty() {
        assert!(FieldValue::from("").is_missing());
        assert!(FieldValue::Null.is_missing());
        assert!(!FieldValue::from(" ").is_missing());
        assert!(!FieldValue::from(0).is_missing());
        assert!(!FieldValue::from(false).is_missing());

        assert!(FieldValue::from(false).is_empty());
        assert!(!FieldValue::from("0").is_empty());
    }

    #[test]
    fn test_loose_comparison() {
        assert!(FieldValue::from("10").loose_eq(&FieldValue::from(10)));
        assert!(FieldValue::from("abc").loose_eq(&FieldValue::from("abc")));
        assert!(FieldValue::Null.loose_eq(&FieldValue::from("")));
        assert_eq!(
            FieldValue::from("9").loose_cmp(&FieldValue::from("10")),
            Some(Ordering::Less)
        );
        assert_eq!(
            FieldValue::from("b").loose_cmp(&FieldValue::from("a")),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_count() {
        assert_eq!(FieldValue::from(vec!["a", "b"]).count(), 2);
        assert_eq!(FieldValue::Null.count(), 0);
        assert_eq!(FieldValue::from("x").count(), 1);
    }
}
