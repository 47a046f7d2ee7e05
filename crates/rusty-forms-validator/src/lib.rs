//! Rusty-Forms-Validator
//!
//! Server-side validation rules that also render as client-side validation
//! attributes. A [`Validator`] holds the rules of one form, a [`Backend`]
//! translates them into a client library's vocabulary (Parsley.js by
//! default), and the same rules run again on submission.

pub mod attributes;
pub mod backend;
pub mod config;
pub mod error;
pub mod form;
pub mod result;
pub mod rule;
pub mod rules;
pub mod validator;
pub mod value;

// Re-export core types
pub use attributes::AttributeSet;
pub use backend::{AttributeNames, Backend, ParsleyBackend, Requirements};
pub use config::ValidatorConfig;
pub use error::{Result, ValidatorError};
pub use form::{BasicForm, Field, Form, FormField};
pub use result::{ValidationError, ValidationResult};
pub use rule::{AttributeSpec, Rule, RuleContext, RuleMeta, RuleOverride};
pub use validator::{BoundValidator, RequiredFields, Validator};
pub use value::{FieldValue, SubmittedData};

// Re-export all rules
pub use rules::*;
