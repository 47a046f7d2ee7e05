// File: src/rules/target.rs
// Purpose: Rules comparing a field against a sibling ("target") field

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ValidatorError};
use crate::form::FormField;
use crate::rule::{Rule, RuleContext, RuleMeta};
use crate::value::FieldValue;

const TARGET_FORMAT: &str = "{TargetFieldID}";

/// Reference to a sibling field, resolved by name on every use
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    name: String,
}

impl Target {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field<'a>(&self, ctx: &RuleContext<'a>) -> Option<&'a dyn FormField> {
        ctx.data_field(&self.name)
    }

    /// Current value of the target field
    pub fn value(&self, rule: &str, ctx: &RuleContext<'_>) -> Result<FieldValue> {
        ctx.field_value(&self.name)
            .ok_or_else(|| ValidatorError::MissingTargetField {
                rule: rule.to_string(),
                target: self.name.clone(),
            })
    }

    pub fn title(&self, ctx: &RuleContext<'_>) -> String {
        self.field(ctx).map(|f| f.title()).unwrap_or_default()
    }

    /// CSS id selector of the target, for client-side wiring
    pub fn field_id(&self, ctx: &RuleContext<'_>) -> String {
        self.field(ctx)
            .map(|f| format!("#{}", f.id()))
            .unwrap_or_default()
    }

    pub fn property(&self, name: &str, ctx: &RuleContext<'_>) -> Option<String> {
        match name {
            "target" => Some(self.name.clone()),
            "targetfieldid" => Some(self.field_id(ctx)),
            "targettitle" => Some(self.title(ctx)),
            "targetvalue" => ctx.field_value(&self.name).map(|v| v.as_text()),
            _ => None,
        }
    }
}

/// Value must equal the target field's current value
#[derive(Debug, Clone, Default)]
pub struct EqualToRule {
    meta: RuleMeta,
    target: Target,
}

impl EqualToRule {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            meta: RuleMeta::new(),
            target: Target::new(target),
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }
}

impl Rule for EqualToRule {
    fn kind(&self) -> &'static str {
        "equal_to"
    }

    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn default_type(&self) -> &str {
        "equalto"
    }

    fn default_format(&self) -> Option<&str> {
        Some(TARGET_FORMAT)
    }

    fn property(&self, name: &str, ctx: &RuleContext<'_>) -> Option<String> {
        self.target.property(name, ctx)
    }

    fn test(&self, value: &FieldValue, ctx: &RuleContext<'_>) -> Result<bool> {
        let target = self.target.value(self.kind(), ctx)?;
        Ok(value.loose_eq(&target))
    }

    fn default_message(&self, ctx: &RuleContext<'_>) -> String {
        format!(
            "This value should be the same as the {} field.",
            self.target.title(ctx)
        )
    }
}

/// Value must differ from the target field's current value
#[derive(Debug, Clone, Default)]
pub struct NotEqualToRule {
    meta: RuleMeta,
    target: Target,
}

impl NotEqualToRule {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            meta: RuleMeta::new(),
            target: Target::new(target),
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }
}

impl Rule for NotEqualToRule {
    fn kind(&self) -> &'static str {
        "not_equal_to"
    }

    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn default_type(&self) -> &str {
        "notequalto"
    }

    fn default_format(&self) -> Option<&str> {
        Some(TARGET_FORMAT)
    }

    fn property(&self, name: &str, ctx: &RuleContext<'_>) -> Option<String> {
        self.target.property(name, ctx)
    }

    fn test(&self, value: &FieldValue, ctx: &RuleContext<'_>) -> Result<bool> {
        let target = self.target.value(self.kind(), ctx)?;
        Ok(!value.loose_eq(&target))
    }

    fn default_message(&self, ctx: &RuleContext<'_>) -> String {
        format!(
            "This value should be different from the {} field.",
            self.target.title(ctx)
        )
    }
}

/// Ordering operator of a [`ComparisonRule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl ComparisonOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::LessThan => "lt",
            ComparisonOp::LessThanOrEqual => "lte",
            ComparisonOp::GreaterThan => "gt",
            ComparisonOp::GreaterThanOrEqual => "gte",
        }
    }

    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            ComparisonOp::LessThan => ordering == Ordering::Less,
            ComparisonOp::LessThanOrEqual => ordering != Ordering::Greater,
            ComparisonOp::GreaterThan => ordering == Ordering::Greater,
            ComparisonOp::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }

    fn phrase(&self) -> &'static str {
        match self {
            ComparisonOp::LessThan => "less than",
            ComparisonOp::LessThanOrEqual => "less than or equal to",
            ComparisonOp::GreaterThan => "greater than",
            ComparisonOp::GreaterThanOrEqual => "greater than or equal to",
        }
    }
}

impl FromStr for ComparisonOp {
    type Err = ValidatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lt" => Ok(ComparisonOp::LessThan),
            "lte" => Ok(ComparisonOp::LessThanOrEqual),
            "gt" => Ok(ComparisonOp::GreaterThan),
            "gte" => Ok(ComparisonOp::GreaterThanOrEqual),
            other => Err(ValidatorError::InvalidComparison {
                kind: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value must compare (lt, lte, gt, gte) against the target field's value.
///
/// The operator doubles as the rule's type, so it is fixed at construction
/// and never taken from configuration.
#[derive(Debug, Clone)]
pub struct ComparisonRule {
    meta: RuleMeta,
    op: ComparisonOp,
    target: Target,
}

impl ComparisonRule {
    /// Fails with [`ValidatorError::InvalidComparison`] for unknown operators
    pub fn new(op: &str, target: impl Into<String>) -> Result<Self> {
        Ok(Self::with_op(op.parse()?, target))
    }

    pub fn with_op(op: ComparisonOp, target: impl Into<String>) -> Self {
        Self {
            meta: RuleMeta::new(),
            op,
            target: Target::new(target),
        }
    }

    pub fn set_op(&mut self, op: &str) -> Result<&mut Self> {
        self.op = op.parse()?;
        Ok(self)
    }

    pub fn op(&self) -> ComparisonOp {
        self.op
    }

    pub fn target(&self) -> &Target {
        &self.target
    }
}

impl Rule for ComparisonRule {
    fn kind(&self) -> &'static str {
        "comparison"
    }

    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn default_type(&self) -> &str {
        self.op.as_str()
    }

    fn rule_type(&self) -> String {
        self.op.as_str().to_string()
    }

    fn default_format(&self) -> Option<&str> {
        Some(TARGET_FORMAT)
    }

    fn property(&self, name: &str, ctx: &RuleContext<'_>) -> Option<String> {
        self.target.property(name, ctx)
    }

    fn test(&self, value: &FieldValue, ctx: &RuleContext<'_>) -> Result<bool> {
        let target = self.target.value(self.kind(), ctx)?;
        Ok(value
            .loose_cmp(&target)
            .map_or(false, |ordering| self.op.holds(ordering)))
    }

    fn default_message(&self, ctx: &RuleContext<'_>) -> String {
        format!(
            "This value should be {} the value of the {} field.",
            self.op.phrase(),
            self.target.title(ctx)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ParsleyBackend;
    use crate::form::{BasicForm, Field};
    use crate::value::SubmittedData;
    use rstest::rstest;

    fn form() -> BasicForm {
        BasicForm::new("Account")
            .with_field(Field::new("password").with_value("secret"))
            .with_field(Field::new("confirm").with_title("Confirm Password"))
            .with_field(Field::new("start").with_title("Start").with_value(10))
    }

    #[test]
    fn test_equal_to() {
        let backend = ParsleyBackend::default();
        let form = form();
        let ctx = RuleContext::new("confirm", &backend).with_form(&form);
        let rule = EqualToRule::new("password");

        assert!(rule.test(&"secret".into(), &ctx).unwrap());
        assert!(!rule.test(&"other".into(), &ctx).unwrap());
        assert_eq!(rule.value(&ctx), "#Account_password");
        assert_eq!(
            rule.message(&ctx),
            "This value should be the same as the Password field."
        );
    }

    #[test]
    fn test_equal_to_evaluates_empty_values() {
        let backend = ParsleyBackend::default();
        let form = form();
        let ctx = RuleContext::new("confirm", &backend).with_form(&form);
        assert!(!EqualToRule::new("password").test(&"".into(), &ctx).unwrap());
    }

    #[test]
    fn test_not_equal_to() {
        let backend = ParsleyBackend::default();
        let form = form();
        let ctx = RuleContext::new("confirm", &backend).with_form(&form);
        let rule = NotEqualToRule::new("password");

        assert!(!rule.test(&"secret".into(), &ctx).unwrap());
        assert!(rule.test(&"other".into(), &ctx).unwrap());
    }

    #[rstest]
    #[case("lt", 9, true)]
    #[case("lt", 10, false)]
    #[case("lte", 10, true)]
    #[case("gt", 10, false)]
    #[case("gt", 11, true)]
    #[case("gte", 10, true)]
    #[case("gte", 9, false)]
    fn test_comparison(#[case] op: &str, #[case] input: i32, #[case] expected: bool) {
        let backend = ParsleyBackend::default();
        let form = form();
        let ctx = RuleContext::new("end", &backend).with_form(&form);
        let rule = ComparisonRule::new(op, "start").unwrap();
        assert_eq!(rule.test(&input.into(), &ctx).unwrap(), expected);
    }

    #[test]
    fn test_comparison_rejects_unknown_type() {
        assert!(matches!(
            ComparisonRule::new("eq", "start"),
            Err(ValidatorError::InvalidComparison { kind }) if kind == "eq"
        ));

        let mut rule = ComparisonRule::with_op(ComparisonOp::LessThan, "start");
        assert!(rule.set_op("ne").is_err());
        assert_eq!(rule.op(), ComparisonOp::LessThan);
    }

    #[test]
    fn test_comparison_type_ignores_configuration() {
        let mut rule = ComparisonRule::with_op(ComparisonOp::GreaterThan, "start");
        rule.meta_mut().set_type("eq");
        assert_eq!(rule.rule_type(), "gt");
    }

    #[test]
    fn test_comparison_message() {
        let backend = ParsleyBackend::default();
        let form = form();
        let ctx = RuleContext::new("end", &backend).with_form(&form);
        let rule = ComparisonRule::new("gte", "start").unwrap();
        assert_eq!(
            rule.message(&ctx),
            "This value should be greater than or equal to the value of the Start field."
        );
    }

    #[test]
    fn test_submitted_data_wins_over_field_value() {
        let backend = ParsleyBackend::default();
        let form = form();
        let mut data = SubmittedData::new();
        data.insert("password".to_string(), "typed".into());
        let ctx = RuleContext::new("confirm", &backend)
            .with_form(&form)
            .with_data(&data);

        let rule = EqualToRule::new("password");
        assert!(rule.test(&"typed".into(), &ctx).unwrap());
        assert!(!rule.test(&"secret".into(), &ctx).unwrap());

        // absent from the submission reads as empty
        let ordered = ComparisonRule::new("gt", "start").unwrap();
        assert!(ordered.test(&1.into(), &ctx).unwrap());
    }

    #[test]
    fn test_missing_target_is_an_error() {
        let backend = ParsleyBackend::default();
        let form = form();
        let ctx = RuleContext::new("confirm", &backend).with_form(&form);
        let rule = EqualToRule::new("nope");
        assert!(matches!(
            rule.test(&"x".into(), &ctx),
            Err(ValidatorError::MissingTargetField { .. })
        ));
    }
}
