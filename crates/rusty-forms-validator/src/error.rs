// File: src/error.rs
// Purpose: Error taxonomy for rule construction and the server-side pass

use thiserror::Error;

/// Errors raised by rules and the validator.
///
/// A failing rule is NOT an error: it is reported through
/// [`ValidationResult`](crate::result::ValidationResult). These variants
/// cover configuration mistakes and failures that make a verdict impossible.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// Comparison rule built with an operator outside lt/lte/gt/gte
    #[error("Invalid comparison type: {kind}")]
    InvalidComparison { kind: String },

    /// Pattern rule whose regular expression does not compile
    #[error("Invalid pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: fancy_regex::Error,
    },

    /// Pattern rule that gave up while matching (backtracking limit)
    #[error("Pattern {pattern:?} could not be matched")]
    PatternMatch {
        pattern: String,
        #[source]
        source: fancy_regex::Error,
    },

    /// Target-based rule pointing at a field the form does not contain
    #[error("Rule '{rule}' references missing target field '{target}'")]
    MissingTargetField { rule: String, target: String },

    /// Remote URL could not be turned into an absolute URL
    #[error("Invalid remote URL {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Remote call failed without producing any HTTP response
    #[error("Remote validation request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type Result<T> = std::result::Result<T, ValidatorError>;
