//! Request and response value objects shared by every transport

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::options::TransportOptions;
use crate::constants::{HEADER_ACCEPT, HEADER_CONTENT_TYPE, JSON_MIME, SEP};
use crate::errors::{LapiError, Result};

/// HTTP methods the API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = LapiError;

    /// Case-insensitive; anything other than GET or POST is rejected.
    fn from_str(s: &str) -> Result<Self> {
        let upper = s.to_ascii_uppercase();
        match upper.as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            _ => Err(LapiError::MethodNotAllowed(upper)),
        }
    }
}

/// Ordered header list with case-insensitive names.
///
/// A name may carry several values (`Set-Cookie`, `Vary`, ...). [`insert`]
/// replaces every value of a name, [`append`] adds one.
///
/// [`insert`]: Headers::insert
/// [`append`]: Headers::append
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, Vec<String>)>);

impl Headers {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// `Accept` and `Content-Type` set to JSON.
    #[must_use]
    pub fn json_defaults() -> Self {
        let mut headers = Self::new();
        headers.insert(HEADER_ACCEPT, JSON_MIME);
        headers.insert(HEADER_CONTENT_TYPE, JSON_MIME);
        headers
    }

    fn entry_mut(&mut self, name: &str) -> Option<&mut Vec<String>> {
        self.0
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, values)| values)
    }

    /// Set `name` to the single `value`, dropping previous values.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entry_mut(&name) {
            Some(values) => *values = vec![value],
            None => self.0.push((name, vec![value])),
        }
    }

    /// Add `value` after the existing values of `name`.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entry_mut(&name) {
            Some(values) => values.push(value),
            None => self.0.push((name, vec![value])),
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Merge `other` over `self`; names present in `other` keep only its
    /// values.
    pub fn extend(&mut self, other: Self) {
        for (name, values) in other.0 {
            match self.entry_mut(&name) {
                Some(existing) => *existing = values,
                None => self.0.push((name, values)),
            }
        }
    }

    /// First value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Every value of `name`, in insertion order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.0
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map_or(&[], |(_, values)| values.as_slice())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// `(name, value)` pairs; a name with several values appears once per
    /// value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |value| (name.as_str(), value.as_str())))
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Repeated names accumulate their values.
impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

/// Immutable description of one API call.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    uri: String,
    method: Method,
    headers: Headers,
    parameters: Value,
    options: TransportOptions,
}

impl Request {
    /// Build a request. `headers` are merged over the JSON defaults.
    #[must_use]
    pub fn new(
        uri: impl Into<String>,
        method: Method,
        headers: Headers,
        parameters: Value,
        options: TransportOptions,
    ) -> Self {
        let mut merged = Headers::json_defaults();
        merged.extend(headers);
        Self { uri: uri.into(), method, headers: merged, parameters, options }
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    #[must_use]
    pub const fn parameters(&self) -> &Value {
        &self.parameters
    }

    #[must_use]
    pub const fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// URL to call. For GET requests the parameters are appended as a query
    /// string, joined with `?` or `&` depending on the URI.
    ///
    /// # Errors
    /// Returns `LapiError::InvalidInput` when GET parameters are neither an
    /// object nor null.
    pub fn target_url(&self) -> Result<String> {
        if self.method != Method::Get {
            return Ok(self.uri.clone());
        }

        let query = encode_query(&self.parameters)?;
        if query.is_empty() {
            return Ok(self.uri.clone());
        }

        let separator = if self.uri.contains('?') { '&' } else { '?' };
        Ok(format!("{}{separator}{query}", self.uri))
    }

    /// JSON body for POST requests, `None` for GET.
    ///
    /// # Errors
    /// Returns `LapiError::Serialization` if the parameters cannot be encoded.
    pub fn body(&self) -> Result<Option<String>> {
        match self.method {
            Method::Get => Ok(None),
            Method::Post => serde_json::to_string(&self.parameters)
                .map(Some)
                .map_err(|e| LapiError::Serialization(e.to_string())),
        }
    }
}

/// Form-urlencode a JSON object into a query string, keys in sorted order.
fn encode_query(parameters: &Value) -> Result<String> {
    let entries = match parameters {
        Value::Null => return Ok(String::new()),
        Value::Object(entries) => entries,
        other => {
            return Err(LapiError::InvalidInput(format!(
                "query parameters must be an object, got {}",
                json_type_name(other)
            )))
        }
    };

    let mut sorted: Vec<_> = entries.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in sorted {
        if let Some(encoded) = query_value(value) {
            serializer.append_pair(key, &encoded);
        }
    }
    Ok(serializer.finish())
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => Some(value.to_string()),
        Value::Array(items) => {
            Some(items.iter().filter_map(query_value).collect::<Vec<_>>().join(SEP))
        }
    }
}

/// Name of a JSON value's type, as used in validation messages.
#[must_use]
pub const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Immutable result of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    body: String,
    headers: Headers,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>, headers: Headers) -> Self {
        Self { status, body: body.into(), headers }
    }

    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Raw body, expected to hold JSON text.
    #[must_use]
    pub fn json_body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }
}
