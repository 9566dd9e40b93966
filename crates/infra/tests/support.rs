//! Shared helpers for the HTTP integration tests.
//!
//! Transports block the calling thread and refuse to run inside an async
//! runtime, so the mock server lives on a runtime owned by the test and every
//! async wiremock call goes through [`TestServer::block_on`].

use std::sync::Once;

use wiremock::{Mock, MockServer, Request as ReceivedRequest};

static TRACING: Once = Once::new();

/// Install a test subscriber once per binary; honours `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Mock LAPI server together with the runtime driving its async API.
pub struct TestServer {
    server: MockServer,
    runtime: tokio::runtime::Runtime,
}

impl TestServer {
    pub fn start() -> Self {
        init_tracing();
        let runtime = tokio::runtime::Runtime::new().expect("test runtime should start");
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    /// Base url of the API, `/v1` included.
    pub fn api_url(&self) -> String {
        format!("{}/v1", self.server.uri())
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.runtime.block_on(self.server.received_requests()).unwrap_or_default()
    }

    /// Requests received on `path`, in arrival order.
    pub fn received_on(&self, path: &str) -> Vec<ReceivedRequest> {
        self.received().into_iter().filter(|request| request.url.path() == path).collect()
    }

    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
