// File: src/rules/date.rs
// Purpose: Date rule with Moment.js (client) <-> chrono strftime (server) formats

use chrono::format::{parse, ParseErrorKind, ParseResult, Parsed, StrftimeItems};

use crate::error::Result;
use crate::rule::{Rule, RuleContext, RuleMeta};
use crate::value::FieldValue;

/// Client format used when none is given
pub const DEFAULT_CLIENT_FORMAT: &str = "YYYY-MM-DD";

/// chrono strftime specifier <-> Moment.js token
pub const FORMAT_MAPPINGS: &[(&str, &str)] = &[
    ("%d", "DD"),
    ("%a", "ddd"),
    ("%-d", "D"),
    ("%A", "dddd"),
    ("%u", "E"),
    ("%w", "e"),
    ("%-j", "DDD"),
    ("%j", "DDDD"),
    ("%V", "WW"),
    ("%-V", "W"),
    ("%B", "MMMM"),
    ("%m", "MM"),
    ("%b", "MMM"),
    ("%-m", "M"),
    ("%Y", "YYYY"),
    ("%y", "YY"),
    ("%P", "a"),
    ("%p", "A"),
    ("%-I", "h"),
    ("%I", "hh"),
    ("%-H", "H"),
    ("%H", "HH"),
    ("%M", "mm"),
    ("%-M", "m"),
    ("%S", "ss"),
    ("%-S", "s"),
    ("%3f", "SSS"),
    ("%Z", "zz"),
    ("%:z", "Z"),
    ("%z", "ZZ"),
    ("%s", "X"),
];

/// Translate a Moment.js format into a chrono strftime format.
///
/// `[...]` sections are literal text, as in Moment.
pub fn to_server_format(client: &str) -> String {
    let mut output = String::with_capacity(client.len() * 2);
    let mut rest = client;

    while let Some(c) = rest.chars().next() {
        if c == '[' {
            let end = rest.find(']').unwrap_or(rest.len());
            push_literal(&mut output, &rest[1..end]);
            rest = rest.get(end + 1..).unwrap_or("");
            continue;
        }

        let token = FORMAT_MAPPINGS
            .iter()
            .filter(|(_, moment)| rest.starts_with(moment))
            .max_by_key(|(_, moment)| moment.len());

        match token {
            Some((strftime, moment)) => {
                output.push_str(strftime);
                rest = &rest[moment.len()..];
            }
            None => {
                push_literal(&mut output, &rest[..c.len_utf8()]);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    output
}

/// Translate a chrono strftime format into a Moment.js format
pub fn to_client_format(server: &str) -> String {
    let mut output = String::with_capacity(server.len());
    let mut literal = String::new();
    let mut rest = server;

    while let Some(c) = rest.chars().next() {
        if rest.starts_with("%%") {
            literal.push('%');
            rest = &rest[2..];
            continue;
        }

        let token = FORMAT_MAPPINGS
            .iter()
            .filter(|(strftime, _)| rest.starts_with(strftime))
            .max_by_key(|(strftime, _)| strftime.len());

        match token {
            Some((strftime, moment)) => {
                flush_literal(&mut output, &mut literal);
                output.push_str(moment);
                rest = &rest[strftime.len()..];
            }
            None => {
                literal.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    flush_literal(&mut output, &mut literal);
    output
}

fn push_literal(output: &mut String, text: &str) {
    output.push_str(&text.replace('%', "%%"));
}

// Letters in a Moment format are tokens, so literal text containing them is bracketed
fn flush_literal(output: &mut String, literal: &mut String) {
    if literal.chars().any(|c| c.is_alphabetic()) {
        output.push('[');
        output.push_str(literal);
        output.push(']');
    } else {
        output.push_str(literal);
    }
    literal.clear();
}

/// Parse `value` strictly against a strftime format
pub fn parses_as(value: &str, format: &str) -> bool {
    let mut parsed = Parsed::new();
    if parse(&mut parsed, value, StrftimeItems::new(format)).is_err() {
        return false;
    }
    consistent(parsed.to_naive_date()) && consistent(parsed.to_naive_time())
}

// Missing components are fine (time-only or date-only formats), impossible ones are not
fn consistent<T>(result: ParseResult<T>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => e.kind() == ParseErrorKind::NotEnough,
    }
}

/// Value must be a date in the configured format
#[derive(Debug, Clone)]
pub struct DateRule {
    meta: RuleMeta,
    client_format: String,
    server_format: Option<String>,
}

impl Default for DateRule {
    fn default() -> Self {
        Self {
            meta: RuleMeta::new(),
            client_format: DEFAULT_CLIENT_FORMAT.to_string(),
            server_format: None,
        }
    }
}

impl DateRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit client format, with an optional server format.
    /// An empty client format falls back to the default.
    pub fn with_formats(client_format: &str, server_format: Option<&str>) -> Self {
        let mut rule = Self::new();
        if !client_format.is_empty() {
            rule.client_format = client_format.to_string();
        }
        rule.server_format = server_format
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        rule
    }

    /// Build from a strftime format, deriving the Moment.js client format
    pub fn from_server_format(server_format: &str) -> Self {
        Self {
            meta: RuleMeta::new(),
            client_format: to_client_format(server_format),
            server_format: Some(server_format.to_string()),
        }
    }

    pub fn set_client_format(&mut self, client_format: impl Into<String>) -> &mut Self {
        self.client_format = client_format.into();
        self
    }

    pub fn set_server_format(&mut self, server_format: impl Into<String>) -> &mut Self {
        self.server_format = Some(server_format.into()).filter(|f: &String| !f.is_empty());
        self
    }

    pub fn client_format(&self) -> &str {
        &self.client_format
    }

    /// Server format, derived from the client format when not set
    pub fn server_format(&self) -> String {
        match &self.server_format {
            Some(format) => format.clone(),
            None => to_server_format(&self.client_format),
        }
    }
}

impl Rule for DateRule {
    fn kind(&self) -> &'static str {
        "date"
    }

    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn default_type(&self) -> &str {
        "date"
    }

    fn default_format(&self) -> Option<&str> {
        Some("{ClientFormat}")
    }

    fn has_required_config(&self) -> bool {
        !self.client_format.is_empty()
    }

    fn property(&self, name: &str, _ctx: &RuleContext<'_>) -> Option<String> {
        match name {
            "clientformat" => Some(self.client_format.clone()),
            "serverformat" => Some(self.server_format()),
            _ => None,
        }
    }

    fn test(&self, value: &FieldValue, ctx: &RuleContext<'_>) -> Result<bool> {
        if !self.is_valid(ctx) || value.is_empty() {
            return Ok(true);
        }
        Ok(parses_as(&value.as_text(), &self.server_format()))
    }

    fn default_message(&self, _ctx: &RuleContext<'_>) -> String {
        "This value appears to be an invalid date.".to_string()
    }
}
