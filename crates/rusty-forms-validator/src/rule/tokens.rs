// File: src/rule/tokens.rs
// Purpose: {Token} substitution inside rule formats and messages

use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^}]*)\}").unwrap());

/// Token names in order of appearance (duplicates kept)
pub fn token_names(template: &str) -> Vec<&str> {
    TOKEN_REGEX
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Replace every `{Name}` with `resolve(Name)`.
///
/// Names are collected from the original template first, then replaced one
/// after another. Unresolved tokens become the empty string.
pub fn replace_tokens<F>(template: &str, resolve: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut output = template.to_string();
    for name in token_names(template) {
        let value = resolve(name).unwrap_or_default();
        output = output.replace(&format!("{{{}}}", name), &value);
    }
    output
}
