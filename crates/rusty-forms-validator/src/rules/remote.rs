// File: src/rules/remote.rs
// Purpose: Remote rule, validity decided by the status code of an HTTP call

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};
use url::{form_urlencoded, Url};

use crate::error::{Result, ValidatorError};
use crate::rule::{Rule, RuleContext, RuleMeta};
use crate::value::FieldValue;

/// Remote validator mode that inverts the status check
pub const REVERSE: &str = "reverse";

/// Outbound request built by a [`RemoteRule`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRequest {
    /// Upper-case HTTP method
    pub method: String,
    pub url: Url,
    pub params: Vec<(String, String)>,
}

impl RemoteRequest {
    /// GET sends params as a query string, anything else as a form body
    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

/// Sends a remote validation request and answers its HTTP status code.
///
/// Error responses that still carry a status are NOT errors: only failures
/// without any response are.
pub trait RemoteTransport: fmt::Debug {
    fn send(&self, request: &RemoteRequest) -> Result<u16>;
}

/// Blocking HTTP transport
#[cfg(feature = "remote-http")]
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "remote-http")]
impl HttpTransport {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "remote-http")]
impl RemoteTransport for HttpTransport {
    fn send(&self, request: &RemoteRequest) -> Result<u16> {
        let transport_error = |source: Box<dyn std::error::Error + Send + Sync>| {
            ValidatorError::Transport {
                url: request.url.to_string(),
                source,
            }
        };

        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| transport_error(Box::new(e)))?;
        let builder = self.client.request(method, request.url.clone());
        let builder = if request.is_get() {
            builder.query(&request.params)
        } else {
            builder.form(&request.params)
        };

        tracing::debug!(method = %request.method, url = %request.url, "Sending remote validation request");

        let response = builder.send().map_err(|e| transport_error(Box::new(e)))?;
        Ok(response.status().as_u16())
    }
}

/// Value is checked by a remote endpoint.
///
/// The field's own name/value pair is added to the configured params. A 2xx
/// status means valid; the `reverse` validator mode flips that.
pub struct RemoteRule {
    meta: RuleMeta,
    url: String,
    params: Vec<(String, String)>,
    options: Map<String, JsonValue>,
    remote_validator: String,
    transport: Arc<dyn RemoteTransport>,
}

impl fmt::Debug for RemoteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteRule")
            .field("url", &self.url)
            .field("params", &self.params)
            .field("options", &self.options)
            .field("remote_validator", &self.remote_validator)
            .finish()
    }
}

impl RemoteRule {
    /// Remote rule using the default HTTP transport
    #[cfg(feature = "remote-http")]
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_transport(url, Arc::new(HttpTransport::default()))
    }

    pub fn with_transport(url: impl Into<String>, transport: Arc<dyn RemoteTransport>) -> Self {
        Self {
            meta: RuleMeta::new(),
            url: url.into(),
            params: Vec::new(),
            options: Map::new(),
            remote_validator: "default".to_string(),
            transport,
        }
    }

    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = url.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        set_pair(&mut self.params, name.into(), value.into());
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_params<I, K, V>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Client options (Parsley `remote-options`); `type` selects the HTTP method
    pub fn set_options(&mut self, options: Map<String, JsonValue>) -> &mut Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &Map<String, JsonValue> {
        &self.options
    }

    pub fn set_remote_validator(&mut self, remote_validator: impl Into<String>) -> &mut Self {
        self.remote_validator = remote_validator.into();
        self
    }

    pub fn remote_validator(&self) -> &str {
        &self.remote_validator
    }

    pub fn is_reverse(&self) -> bool {
        self.remote_validator == REVERSE
    }

    pub fn method(&self) -> String {
        self.options
            .get("type")
            .and_then(JsonValue::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or("GET")
            .to_ascii_uppercase()
    }

    /// URL plus the configured params as a query string
    pub fn url_with_params(&self) -> String {
        if self.params.is_empty() {
            return self.url.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish();
        format!("{}?{}", self.url, query)
    }

    /// Resolve a relative URL against the application base URL
    pub fn absolute_url(&self, base_url: Option<&Url>) -> Result<Url> {
        let invalid = |source| ValidatorError::InvalidUrl {
            url: self.url.clone(),
            source,
        };
        match Url::parse(&self.url) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match base_url {
                Some(base) => base.join(&self.url).map_err(invalid),
                None => Err(invalid(url::ParseError::RelativeUrlWithoutBase)),
            },
            Err(e) => Err(invalid(e)),
        }
    }

    pub fn is_valid_status_code(&self, code: u16) -> bool {
        let valid = (200..300).contains(&code);
        if self.is_reverse() {
            !valid
        } else {
            valid
        }
    }

    /// The request sent for a submitted value
    pub fn request(&self, value: &FieldValue, ctx: &RuleContext<'_>) -> Result<RemoteRequest> {
        let mut params = self.params.clone();
        set_pair(&mut params, ctx.field.to_string(), value.as_text());

        Ok(RemoteRequest {
            method: self.method(),
            url: self.absolute_url(ctx.base_url)?,
            params,
        })
    }
}

fn set_pair(pairs: &mut Vec<(String, String)>, name: String, value: String) {
    match pairs.iter_mut().find(|(k, _)| *k == name) {
        Some(pair) => pair.1 = value,
        None => pairs.push((name, value)),
    }
}

impl Rule for RemoteRule {
    fn kind(&self) -> &'static str {
        "remote"
    }

    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RuleMeta {
        &mut self.meta
    }

    fn default_type(&self) -> &str {
        "remote"
    }

    fn default_format(&self) -> Option<&str> {
        Some("{URLWithParams}")
    }

    fn has_required_config(&self) -> bool {
        !self.url.is_empty()
    }

    fn property(&self, name: &str, ctx: &RuleContext<'_>) -> Option<String> {
        match name {
            "url" => Some(self.url.clone()),
            "urlwithparams" => Some(self.url_with_params()),
            "absoluteurl" => self.absolute_url(ctx.base_url).ok().map(String::from),
            "method" => Some(self.method()),
            "remotevalidator" => Some(self.remote_validator.clone()),
            _ => None,
        }
    }

    fn extra_attributes(&self, _ctx: &RuleContext<'_>) -> Vec<(String, String)> {
        let mut attributes = Vec::new();
        if !self.options.is_empty() {
            attributes.push((
                "remote-options".to_string(),
                JsonValue::Object(self.options.clone()).to_string(),
            ));
        }
        if !self.remote_validator.is_empty() {
            attributes.push(("remote-validator".to_string(), self.remote_validator.clone()));
        }
        attributes
    }

    fn test(&self, value: &FieldValue, ctx: &RuleContext<'_>) -> Result<bool> {
        if !self.is_valid(ctx) || value.is_empty() {
            return Ok(true);
        }

        let request = self.request(value, ctx)?;
        let code = self.transport.send(&request)?;
        tracing::debug!(field = ctx.field, code, "Remote validation answered");

        Ok(self.is_valid_status_code(code))
    }
}
