//! Minimal fallback transport on the async `reqwest` client.

use lapi_core::Transport;
use lapi_domain::{LapiError, Request, Response, Result, TransportError, TransportOptions};
use reqwest::Client;
use tracing::debug;

use super::tls::TlsMaterial;
use super::{ensure_blocking_context, normalize_response, prepare, PreparedRequest};
use crate::errors::InfraError;

/// Builds a client and a single-threaded runtime for every call.
///
/// No state is kept between calls, which makes it the simplest strategy to
/// reason about when the default one misbehaves.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuntimeTransport;

impl RuntimeTransport {
    pub const fn new() -> Self {
        Self
    }
}

impl Transport for RuntimeTransport {
    fn execute(&self, request: &Request) -> Result<Response> {
        let prepared = prepare(request)?;
        ensure_blocking_context()?;
        let client = build_client(request.options())?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::Setup(format!("cannot start HTTP runtime: {e}")))?;

        runtime.block_on(send(client, prepared))
    }
}

async fn send(client: Client, prepared: PreparedRequest) -> Result<Response> {
    debug!(method = %prepared.method, url = %prepared.url, "sending HTTP request");

    let mut builder = client.request(prepared.method, &prepared.url).headers(prepared.headers);
    if let Some(body) = prepared.body {
        builder = builder.body(body);
    }

    let response = builder.send().await.map_err(|err| LapiError::from(InfraError::from(err)))?;
    let status = response.status().as_u16();
    let headers = response.headers().clone();
    debug!(status, "received HTTP response");

    normalize_response(Some(status), response.text().await, &headers)
}

fn build_client(options: &TransportOptions) -> Result<Client> {
    let tls = TlsMaterial::load(options)?;

    let mut builder = Client::builder()
        .no_proxy()
        .use_rustls_tls()
        .danger_accept_invalid_certs(tls.accept_invalid_certs);

    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(identity) = tls.identity {
        builder = builder.identity(identity);
    }

    if let Some(ca) = tls.ca_certificate {
        builder = builder.tls_built_in_root_certs(false).add_root_certificate(ca);
    }

    builder.build().map_err(|err| LapiError::from(InfraError::from(err)))
}
