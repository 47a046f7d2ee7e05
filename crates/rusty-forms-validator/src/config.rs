// File: src/config.rs
// Purpose: Configuration parsing from rusty-forms.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::rule::{AttributeSpec, RuleOverride, BOOLEAN_FORMAT};

/// Validator configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidatorConfig {
    #[serde(default)]
    pub validator: ValidatorSection,

    #[serde(default)]
    pub backend: BackendConfig,

    /// Per rule kind overrides, keyed by `Rule::kind()`
    #[serde(default)]
    pub rules: BTreeMap<String, RuleOverride>,
}

/// Validator behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorSection {
    /// Emit client-side validation (default: true)
    #[serde(default = "default_true")]
    pub client_side: bool,

    /// Run rules on submission (default: true)
    #[serde(default = "default_true")]
    pub server_side: bool,

    /// Absolute base URL for relative remote rule URLs
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Backend wire vocabulary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Prefix added to every rule attribute (default: "data-parsley-")
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Attribute name used by rules that do not set one (default: "$type")
    #[serde(default = "default_attribute")]
    pub default_attribute: Option<AttributeSpec>,

    /// Attribute name templates, `%s` is replaced by the argument
    #[serde(default = "default_mappings")]
    pub mappings: BTreeMap<String, String>,

    #[serde(default = "default_required_js")]
    pub required_js: Vec<String>,

    #[serde(default)]
    pub required_css: Vec<String>,

    #[serde(default)]
    pub parsley: ParsleyConfig,
}

/// Parsley form options (Bootstrap 4 classes by default)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsleyConfig {
    /// Events that trigger validation (default: "change")
    #[serde(default = "default_trigger_on")]
    pub trigger_on: String,

    #[serde(default = "default_group_class")]
    pub group_class: String,

    #[serde(default = "default_error_wrapper_class")]
    pub error_wrapper_class: String,

    #[serde(default = "default_group_error_class")]
    pub group_error_class: String,

    #[serde(default = "default_group_success_class")]
    pub group_success_class: String,

    #[serde(default = "default_field_error_class")]
    pub field_error_class: String,

    #[serde(default = "default_field_success_class")]
    pub field_success_class: String,
}

// Default values
fn default_true() -> bool {
    true
}

fn default_prefix() -> String {
    "data-parsley-".to_string()
}

fn default_attribute() -> Option<AttributeSpec> {
    Some(AttributeSpec::parse("$type"))
}

fn default_mappings() -> BTreeMap<String, String> {
    BTreeMap::from([("message".to_string(), "%s-message".to_string())])
}

fn default_required_js() -> Vec<String> {
    vec!["rusty-forms-validator/client/dist/js/parsley.js".to_string()]
}

fn default_trigger_on() -> String {
    "change".to_string()
}

fn default_group_class() -> String {
    "form-group".to_string()
}

fn default_error_wrapper_class() -> String {
    "form-control-feedback".to_string()
}

fn default_group_error_class() -> String {
    "has-danger".to_string()
}

fn default_group_success_class() -> String {
    "has-success".to_string()
}

fn default_field_error_class() -> String {
    "form-control-danger".to_string()
}

fn default_field_success_class() -> String {
    "form-control-success".to_string()
}

/// Built-in overrides for rule kinds whose Parsley spelling differs from
/// the generic `$type` attribute
pub fn default_rule_override(kind: &str) -> RuleOverride {
    match kind {
        "alpha_num" | "url" => RuleOverride {
            attribute: Some(AttributeSpec::parse("type")),
            ..RuleOverride::default()
        },
        "required" | "domain" => RuleOverride {
            format: Some(BOOLEAN_FORMAT.to_string()),
            ..RuleOverride::default()
        },
        _ => RuleOverride::default(),
    }
}

// Default implementations
impl Default for ValidatorSection {
    fn default() -> Self {
        Self {
            client_side: true,
            server_side: true,
            base_url: None,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            default_attribute: default_attribute(),
            mappings: default_mappings(),
            required_js: default_required_js(),
            required_css: Vec::new(),
            parsley: ParsleyConfig::default(),
        }
    }
}

impl Default for ParsleyConfig {
    fn default() -> Self {
        Self {
            trigger_on: default_trigger_on(),
            group_class: default_group_class(),
            error_wrapper_class: default_error_wrapper_class(),
            group_error_class: default_group_error_class(),
            group_success_class: default_group_success_class(),
            field_error_class: default_field_error_class(),
            field_success_class: default_field_success_class(),
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from rusty-forms.toml
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist or is empty, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: ValidatorConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from default path (./rusty-forms.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("rusty-forms.toml")
    }

    /// Effective override for a rule kind: configured fields win over the
    /// built-in ones, field by field
    pub fn rule_override(&self, kind: &str) -> RuleOverride {
        let builtin = default_rule_override(kind);
        match self.rules.get(kind) {
            Some(configured) => RuleOverride {
                rule_type: configured.rule_type.clone().or(builtin.rule_type),
                format: configured.format.clone().or(builtin.format),
                attribute: configured.attribute.clone().or(builtin.attribute),
            },
            None => builtin,
        }
    }
}
