//! HTTP transport strategies
//!
//! Two interchangeable [`Transport`] implementations built on `reqwest`:
//!
//! - [`BlockingTransport`] (default): `reqwest::blocking` client, reused while
//!   the transport options stay the same.
//! - [`RuntimeTransport`]: the async client driven on a private
//!   single-threaded runtime, built fresh for every call.
//!
//! Both go through [`prepare`] and [`normalize_response`], so URL, headers,
//! body and TLS handling cannot diverge between them.

pub mod client;
pub mod runtime;
pub mod tls;

use std::sync::Arc;

use lapi_core::Transport;
use lapi_domain::constants::{HEADER_API_KEY, HEADER_USER_AGENT};
use lapi_domain::{impl_choice_conversions, Headers, Method, Request, Response, Result, TransportError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

pub use self::client::BlockingTransport;
pub use self::runtime::RuntimeTransport;

/// Which transport strategy to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportKind {
    #[default]
    Blocking,
    Runtime,
}

impl_choice_conversions!(TransportKind {
    Blocking => "blocking",
    Runtime => "runtime",
});

impl TransportKind {
    /// Instantiate the selected strategy.
    #[must_use]
    pub fn build(self) -> Arc<dyn Transport> {
        match self {
            Self::Blocking => Arc::new(BlockingTransport::new()),
            Self::Runtime => Arc::new(RuntimeTransport::new()),
        }
    }
}

/// Everything a strategy needs to send a request, validated up front.
#[derive(Debug, Clone)]
pub(crate) struct PreparedRequest {
    pub method: reqwest::Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Validate a request and translate it for `reqwest`.
///
/// Fails with `MissingUserAgent` before anything else is looked at.
pub(crate) fn prepare(request: &Request) -> Result<PreparedRequest> {
    if !request.headers().contains(HEADER_USER_AGENT) {
        return Err(TransportError::MissingUserAgent.into());
    }

    let mut headers = HeaderMap::with_capacity(request.headers().len() + 1);
    for (name, value) in request.headers().iter() {
        headers.append(header_name(name)?, header_value(name, value)?);
    }

    if let Some(api_key) = request.options().api_key_header() {
        if !request.headers().contains(HEADER_API_KEY) {
            headers.insert(header_name(HEADER_API_KEY)?, header_value(HEADER_API_KEY, api_key)?);
        }
    }

    let method = match request.method() {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
    };

    Ok(PreparedRequest { method, url: request.target_url()?, headers, body: request.body()? })
}

/// Turn the raw parts of an HTTP answer into a [`Response`].
pub(crate) fn normalize_response(
    status: Option<u16>,
    body: std::result::Result<String, reqwest::Error>,
    headers: &HeaderMap,
) -> Result<Response> {
    let status = status.filter(|code| *code != 0).ok_or(TransportError::NoStatus)?;
    let body = body.map_err(|e| TransportError::CallFailed(format!("unreadable response body: {e}")))?;

    let headers: Headers = headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|value| (name.as_str(), value)))
        .collect();

    Ok(Response::new(status, body, headers))
}

/// Blocking `reqwest` clients and nested runtimes both panic inside an async
/// context; fail cleanly instead.
pub(crate) fn ensure_blocking_context() -> Result<()> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(TransportError::Setup(
            "blocking transport called from within an async runtime".into(),
        )
        .into());
    }
    Ok(())
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| TransportError::Setup(format!("invalid header name {name:?}: {e}")).into())
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| TransportError::Setup(format!("invalid value for header {name:?}: {e}")).into())
}

#[cfg(test)]
mod tests {
    use lapi_domain::{AuthType, TransportOptions};
    use serde_json::json;

    use super::*;

    fn request(method: Method, headers: Headers, options: TransportOptions) -> Request {
        Request::new("http://h/v1/watchers", method, headers, json!({"a": "b"}), options)
    }

    #[test]
    fn user_agent_is_mandatory() {
        let err = prepare(&request(Method::Post, Headers::new(), TransportOptions::default()))
            .unwrap_err();
        assert_eq!(err.to_string(), "User agent is required");
        assert_eq!(err.status_code(), Some(400));
    }

    #[test]
    fn api_key_header_is_added_for_api_key_auth() {
        let options = TransportOptions {
            auth_type: AuthType::ApiKey,
            api_key: Some("s3cr3t".into()),
            ..TransportOptions::default()
        };
        let prepared =
            prepare(&request(Method::Get, Headers::new().with("User-Agent", "ua/v1"), options)).unwrap();

        assert_eq!(prepared.headers.get("x-api-key").unwrap(), "s3cr3t");
        assert_eq!(prepared.headers.get("accept").unwrap(), "application/json");
        assert_eq!(prepared.url, "http://h/v1/watchers?a=b");
        assert!(prepared.body.is_none());
    }

    #[test]
    fn post_carries_json_body() {
        let prepared = prepare(&request(
            Method::Post,
            Headers::new().with("User-Agent", "ua/v1"),
            TransportOptions::default(),
        ))
        .unwrap();

        assert_eq!(prepared.method, reqwest::Method::POST);
        assert_eq!(prepared.body.as_deref(), Some("{\"a\":\"b\"}"));
        assert!(prepared.headers.get("x-api-key").is_none());
    }

    #[test]
    fn invalid_header_is_a_setup_error() {
        let err = prepare(&request(
            Method::Get,
            Headers::new().with("User-Agent", "ua/v1").with("Bad Header", "x"),
            TransportOptions::default(),
        ))
        .unwrap_err();
        assert!(matches!(err, lapi_domain::LapiError::Transport(TransportError::Setup(_))));
    }

    #[test]
    fn repeated_response_headers_are_all_kept() {
        let mut raw = HeaderMap::new();
        raw.append("vary", HeaderValue::from_static("Accept"));
        raw.append("vary", HeaderValue::from_static("Origin"));
        raw.append("set-cookie", HeaderValue::from_static("a=1"));
        raw.append("set-cookie", HeaderValue::from_static("b=2"));

        let response = normalize_response(Some(200), Ok("{}".into()), &raw).unwrap();

        assert_eq!(response.headers().get_all("Vary"), ["Accept", "Origin"]);
        assert_eq!(response.headers().get_all("Set-Cookie"), ["a=1", "b=2"]);
    }

    #[test]
    fn missing_status_is_reported() {
        let err = normalize_response(None, Ok(String::new()), &HeaderMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "Unexpected empty response http code");

        let response = normalize_response(Some(204), Ok(String::new()), &HeaderMap::new()).unwrap();
        assert_eq!(response.status(), 204);
    }

    #[test]
    fn transport_kind_parses_from_cli_strings() {
        assert_eq!("runtime".parse::<TransportKind>().unwrap(), TransportKind::Runtime);
        assert_eq!(TransportKind::default(), TransportKind::Blocking);
        assert!("curl".parse::<TransportKind>().is_err());
    }
}
