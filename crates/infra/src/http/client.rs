use lapi_core::Transport;
use lapi_domain::{LapiError, Request, Response, Result, TransportOptions};
use parking_lot::Mutex;
use reqwest::blocking::Client as BlockingClient;
use tracing::debug;

use super::tls::TlsMaterial;
use super::{ensure_blocking_context, normalize_response, prepare};
use crate::errors::InfraError;

/// Default transport: `reqwest::blocking` with rustls, client certificates
/// and CA bundles.
///
/// The underlying client is built lazily and reused as long as requests carry
/// the same [`TransportOptions`].
#[derive(Default)]
pub struct BlockingTransport {
    cached: Mutex<Option<(TransportOptions, BlockingClient)>>,
}

impl BlockingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn client_for(&self, options: &TransportOptions) -> Result<BlockingClient> {
        let mut cached = self.cached.lock();
        if let Some((cached_options, client)) = cached.as_ref() {
            if cached_options == options {
                return Ok(client.clone());
            }
        }

        let client = build_client(options)?;
        *cached = Some((options.clone(), client.clone()));
        Ok(client)
    }
}

impl Transport for BlockingTransport {
    fn execute(&self, request: &Request) -> Result<Response> {
        let prepared = prepare(request)?;
        ensure_blocking_context()?;
        let client = self.client_for(request.options())?;

        debug!(method = %prepared.method, url = %prepared.url, "sending HTTP request");

        let mut builder = client.request(prepared.method, &prepared.url).headers(prepared.headers);
        if let Some(body) = prepared.body {
            builder = builder.body(body);
        }

        let response = builder.send().map_err(|err| LapiError::from(InfraError::from(err)))?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        debug!(status, "received HTTP response");

        normalize_response(Some(status), response.text(), &headers)
    }
}

fn build_client(options: &TransportOptions) -> Result<BlockingClient> {
    let tls = TlsMaterial::load(options)?;

    // The blocking builder defaults to a 30s timeout; `None` disables it.
    let mut builder = BlockingClient::builder()
        .no_proxy()
        .use_rustls_tls()
        .timeout(options.timeout)
        .danger_accept_invalid_certs(tls.accept_invalid_certs);

    if let Some(identity) = tls.identity {
        builder = builder.identity(identity);
    }

    if let Some(ca) = tls.ca_certificate {
        builder = builder.tls_built_in_root_certs(false).add_root_certificate(ca);
    }

    builder.build().map_err(|err| LapiError::from(InfraError::from(err)))
}
