//! Low-level API client
//!
//! Builds a [`Request`] from a method, an endpoint and parameters, hands it
//! to the configured [`Transport`] and decodes the JSON answer. Knows nothing
//! about authentication: headers are supplied by the caller.

use std::sync::Arc;

use lapi_domain::{Configuration, Headers, LapiError, Method, Request, Response, Result, TransportOptions};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::ports::Transport;

/// Thin request/decode layer over a [`Transport`].
#[derive(Clone)]
pub struct LapiClient {
    base_url: String,
    options: TransportOptions,
    transport: Arc<dyn Transport>,
}

impl LapiClient {
    /// Create a client for the configured API url.
    pub fn new(config: &Configuration, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: normalize_base_url(config.api_url()),
            options: config.transport_options(),
            transport,
        }
    }

    /// API url, always ending with exactly one `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a request with a method given by name (`get`, `POST`, ...).
    ///
    /// # Errors
    /// `LapiError::MethodNotAllowed` for anything but GET and POST, raised
    /// before any network call; otherwise see [`LapiClient::send`].
    pub fn request(
        &self,
        method: &str,
        endpoint: &str,
        parameters: Value,
        headers: Headers,
    ) -> Result<Value> {
        let method = method.parse::<Method>()?;
        self.send(method, endpoint, parameters, headers)
    }

    /// Issue a request and decode its JSON body.
    ///
    /// # Errors
    /// Transport failures are returned unchanged. A non-2xx status yields
    /// `LapiError::UnexpectedStatus`; a body that is not JSON yields
    /// `LapiError::InvalidBody`.
    pub fn send(
        &self,
        method: Method,
        endpoint: &str,
        parameters: Value,
        headers: Headers,
    ) -> Result<Value> {
        let url = self.full_url(endpoint);
        let request = Request::new(url, method, headers, parameters, self.options.clone());

        debug!(%method, endpoint, "sending LAPI request");

        let response = self.transport.execute(&request).inspect_err(|err| {
            warn!(%method, endpoint, error = %err, "LAPI transport failure");
        })?;

        debug!(%method, endpoint, status = response.status(), "received LAPI response");

        Self::format_response_body(&response).inspect_err(|err| {
            warn!(%method, endpoint, status = response.status(), error = %err, "LAPI request failed");
        })
    }

    /// Validate a response and decode its body.
    ///
    /// The status check runs first: a non-2xx response fails even when its
    /// body is valid JSON. An empty or `null` body decodes to `{}`.
    ///
    /// # Errors
    /// See [`LapiClient::send`].
    pub fn format_response_body(response: &Response) -> Result<Value> {
        let status = response.status();
        let body = response.json_body();

        if !(200..300).contains(&status) {
            return Err(LapiError::UnexpectedStatus { status, body: body.replace(['\r', '\n'], "") });
        }

        if body.is_empty() || body == "null" {
            return Ok(Value::Object(Map::new()));
        }

        match serde_json::from_str(body) {
            Ok(Value::Null) => Err(LapiError::InvalidBody("body decodes to null".into())),
            Ok(value) => Ok(value),
            Err(e) => Err(LapiError::InvalidBody(e.to_string())),
        }
    }

    fn full_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim_end_matches('/'))
}
