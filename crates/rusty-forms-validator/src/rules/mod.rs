// File: src/rules/mod.rs
// Purpose: Concrete validation rules

use once_cell::sync::Lazy;
use regex::Regex;

pub mod bounds;
pub mod date;
pub mod domain;
pub mod numeric;
pub mod pattern;
pub mod remote;
pub mod required;
pub mod target;
pub mod text;

pub use bounds::{Bounds, LengthRule, RangeRule, WordsRule};
pub use date::DateRule;
pub use domain::DomainRule;
pub use numeric::{MaxRule, MaxWordsRule, MinCheckRule, MinRule};
pub use pattern::PatternRule;
pub use remote::{RemoteRequest, RemoteRule, RemoteTransport};
#[cfg(feature = "remote-http")]
pub use remote::HttpTransport;
pub use required::RequiredRule;
pub use target::{ComparisonOp, ComparisonRule, EqualToRule, NotEqualToRule, Target};
pub use text::{AlphaNumRule, UrlRule};

// Runs of letters, apostrophes and hyphens (str_word_count semantics)
static WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z'][A-Za-z'-]*").unwrap());

/// Count words in a value
pub fn word_count(value: &str) -> usize {
    WORD_REGEX.find_iter(value).count()
}
